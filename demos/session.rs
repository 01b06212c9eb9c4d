//! Walks one session through the commands a transfer server issues, printing
//! what the server would send back.
//!
//! ```text
//! cargo run --example session            # in-memory backend
//! cargo run --example session -- ./srv   # serve a host directory
//! ```

use std::io::Read;
use std::path::Path;
use std::sync::Arc;

use vfs_ftp_driver::{
    Driver, DriverFactory, FsError, MemoryFs, NativeFs, SimplePerm, Vfs, VfsDriverFactory,
};

fn main() -> Result<(), FsError> {
    let backend: Arc<dyn Vfs> = match std::env::args().nth(1) {
        Some(root) => Arc::new(NativeFs::new(root)),
        None => Arc::new(MemoryFs::new()),
    };
    let factory = VfsDriverFactory::new(backend).with_perm(SimplePerm::new("ftp", "ftp"));
    let mut session = factory.new_driver()?;

    // MKD / CWD
    session.make_dir("/incoming")?;
    session.change_dir("/incoming")?;
    println!("257 \"{}\" is the current directory", session.current_dir());

    // STOR then APPE
    let stored = session.put_file("/incoming/log.txt", &mut &b"first line\n"[..], false)?;
    let appended = session.put_file("/incoming/log.txt", &mut &b"second line\n"[..], true)?;
    println!("226 transfer complete ({stored} + {appended} bytes)");

    // STOR onto a directory
    if let Err(e) = session.put_file("/incoming", &mut &b"oops"[..], false) {
        println!("550 {e}");
    }

    // LIST
    session.list_dir("/incoming", &mut |info| {
        let kind = if info.is_dir { 'd' } else { '-' };
        let perm = session.perm();
        println!(
            "{kind} {} {} {:>8} {}",
            perm.owner(),
            perm.group(),
            info.size,
            info.name
        );
        Ok(())
    })?;

    // REST 11 + RETR
    let (size, mut reader) = session.open_for_read("/incoming/log.txt", 11)?;
    let mut rest = String::new();
    reader
        .read_to_string(&mut rest)
        .map_err(|e| FsError::from_io("read", Path::new("/incoming/log.txt"), e))?;
    drop(reader);
    println!("150 opening data connection ({size} bytes total)");
    print!("{rest}");

    // RNFR / RNTO
    session.put_file("/incoming/other.txt", &mut &b""[..], false)?;
    if let Err(e) = session.rename("/incoming/log.txt", "/incoming/other.txt") {
        println!("553 {e}");
    }
    session.rename("/incoming/log.txt", "/incoming/archived.txt")?;

    // SIZE
    let info = session.stat("/incoming/archived.txt")?;
    println!("213 {}", info.size);

    // DELE / RMD
    session.delete_file("/incoming/other.txt")?;
    session.delete_dir("/incoming")?;
    println!("250 cleaned up");

    Ok(())
}
