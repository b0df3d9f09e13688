//! Byte pumps connecting the bridge's stdio to the server's.

use std::io::{self, Read, Write};

use tracing::trace;

/// Log target for stdio bridging.
const BRIDGE_TARGET: &str = "acute_lsp::bridge";

const CHUNK_SIZE: usize = 8 * 1024;

/// Copies `reader` into `writer` until end of input, flushing after every
/// chunk so protocol messages are never held back.
///
/// Returns the number of bytes copied. A broken pipe on the writer ends the
/// copy early and is not an error.
pub fn pump<R: Read, W: Write>(mut reader: R, mut writer: W) -> io::Result<u64> {
    let mut buffer = [0_u8; CHUNK_SIZE];
    let mut copied = 0_u64;
    loop {
        let count = match reader.read(&mut buffer) {
            Ok(0) => break,
            Ok(count) => count,
            Err(error) if error.kind() == io::ErrorKind::Interrupted => continue,
            Err(error) => return Err(error),
        };
        let chunk = buffer.get(..count).unwrap_or_default();
        match writer.write_all(chunk).and_then(|()| writer.flush()) {
            Ok(()) => copied += chunk.len() as u64,
            Err(error) if error.kind() == io::ErrorKind::BrokenPipe => {
                trace!(target: BRIDGE_TARGET, "peer closed its end of the pipe");
                break;
            }
            Err(error) => return Err(error),
        }
    }
    Ok(copied)
}
