use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use log::debug;

use window_stream::{ByteSource, FsSource, OpenSource, SeekableMmap, WindowStream, WindowedSource};

/// Dump a window of a file to stdout
#[derive(Parser, Debug)]
#[command(name = "windump", version, about)]
struct Args {
    /// File containing the window
    path: PathBuf,

    /// Absolute offset where the window starts
    #[arg(short, long, default_value_t = 0)]
    start: u64,

    /// Window length in bytes (defaults to the rest of the file)
    #[arg(short, long)]
    length: Option<u64>,

    /// Skip this many bytes into the window before dumping
    #[arg(long, default_value_t = 0)]
    skip: u64,

    /// Dump at most this many bytes
    #[arg(short = 'n', long)]
    count: Option<u64>,

    /// Read-ahead buffer size
    #[arg(long, default_value_t = window_stream::DEFAULT_BUFFER_SIZE)]
    buffer_size: usize,

    /// Read through a memory map instead of file reads
    #[arg(long)]
    mmap: bool,

    /// Print a hex dump instead of raw bytes
    #[arg(long)]
    hex: bool,
}

fn open<S: OpenSource>(args: &Args) -> Result<WindowStream<S>> {
    let source = WindowedSource::<S>::open(&args.path, args.start, args.length)
        .with_context(|| format!("opening window of {}", args.path.display()))?;
    let stream = WindowStream::with_capacity(args.buffer_size, source)?;
    Ok(stream)
}

fn dump<S: ByteSource>(
    mut stream: WindowStream<S>,
    args: &Args,
    out: &mut impl Write,
) -> Result<u64> {
    if args.skip > 0 {
        stream
            .seek(SeekFrom::Start(args.skip))
            .with_context(|| format!("skipping {} bytes", args.skip))?;
    }
    let count = args.count.unwrap_or(u64::MAX);
    debug!(
        "dumping {} of {} window bytes",
        count.min(stream.remaining()),
        stream.len()
    );

    let mut limited = stream.take(count);
    if args.hex {
        hex_dump(&mut limited, args.skip, out)
    } else {
        Ok(io::copy(&mut limited, out)?)
    }
}

fn hex_dump(reader: &mut impl Read, base: u64, out: &mut impl Write) -> Result<u64> {
    let mut offset = base;
    let mut line = [0u8; 16];
    loop {
        let got = fill_line(reader, &mut line)?;
        if got == 0 {
            break;
        }
        write!(out, "{:08x}  ", offset)?;
        for (i, slot) in line.iter().enumerate() {
            if i < got {
                write!(out, "{:02x} ", slot)?;
            } else {
                write!(out, "   ")?;
            }
        }
        let text: String = line[..got]
            .iter()
            .map(|&b| if b.is_ascii_graphic() || b == b' ' { b as char } else { '.' })
            .collect();
        writeln!(out, " |{}|", text)?;
        offset += got as u64;
    }
    Ok(offset - base)
}

fn fill_line(reader: &mut impl Read, line: &mut [u8]) -> io::Result<usize> {
    let mut got = 0;
    while got < line.len() {
        match reader.read(&mut line[got..])? {
            0 => break,
            n => got += n,
        }
    }
    Ok(got)
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let stdout = io::stdout();
    let mut out = stdout.lock();
    let written = if args.mmap {
        dump(open::<SeekableMmap>(&args)?, &args, &mut out)?
    } else {
        dump(open::<FsSource>(&args)?, &args, &mut out)?
    };
    out.flush()?;
    debug!("wrote {} bytes", written);
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;

    fn args(extra: &[&str]) -> Args {
        let mut argv = vec!["windump", "archive.pak"];
        argv.extend_from_slice(extra);
        Args::try_parse_from(argv).unwrap()
    }

    fn stream(data: &[u8], start: u64, length: Option<u64>) -> WindowStream<Cursor<Vec<u8>>> {
        WindowStream::from_source(Cursor::new(data.to_vec()), start, length).unwrap()
    }

    #[test]
    fn parses_window_flags() {
        let args = args(&["--start", "10", "--length", "20", "--skip", "2", "-n", "5", "--hex"]);
        assert_eq!(args.start, 10);
        assert_eq!(args.length, Some(20));
        assert_eq!(args.skip, 2);
        assert_eq!(args.count, Some(5));
        assert!(args.hex);
        assert_eq!(args.buffer_size, window_stream::DEFAULT_BUFFER_SIZE);
    }

    #[test]
    fn raw_dump_honours_skip_and_count() {
        let data: Vec<u8> = (0..100).collect();
        let args = args(&["--skip", "3", "-n", "4"]);
        let mut out = Vec::new();
        let written = dump(stream(&data, 10, Some(20)), &args, &mut out).unwrap();
        assert_eq!(written, 4);
        assert_eq!(out, vec![13, 14, 15, 16]);
    }

    #[test]
    fn skip_past_window_is_an_error() {
        let data: Vec<u8> = (0..100).collect();
        let args = args(&["--skip", "21"]);
        let mut out = Vec::new();
        assert!(dump(stream(&data, 10, Some(20)), &args, &mut out).is_err());
    }

    #[test]
    fn hex_dump_lines() {
        let data = b"0123456789abcdefXYZ".to_vec();
        let args = args(&["--hex"]);
        let mut out = Vec::new();
        let written = dump(stream(&data, 0, None), &args, &mut out).unwrap();
        assert_eq!(written, 19);

        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("00000000  30 31 32"));
        assert!(lines[0].ends_with("|0123456789abcdef|"));
        assert!(lines[1].starts_with("00000010  58 59 5a"));
        assert!(lines[1].ends_with("|XYZ|"));
    }
}
