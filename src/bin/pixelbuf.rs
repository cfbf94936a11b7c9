use std::{
    fs::File,
    io::{BufReader, BufWriter, Write as _},
    path::{Path, PathBuf},
};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use pixelbuf::{
    BufferAllocator, HeapAllocator, ImageBuffer, PixelBufferExt, PixelFormat, Region,
    SerializedBuffer,
};

const DEFAULT_ROW_ALIGNMENT: usize = 64;

#[derive(Parser, Debug)]
#[command(name = "pixelbuf", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Load a PNG into an RGBA buffer and write the serialized buffer as JSON.
    Import(ImportArgs),
    /// Decode a serialized buffer and write it as a PNG (RGBA and L008 only).
    Export(ExportArgs),
    /// Print the geometry of a serialized buffer without decoding it.
    Inspect(InspectArgs),
}

#[derive(Parser, Debug)]
struct ImportArgs {
    /// Input PNG.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Output JSON path.
    #[arg(long)]
    out: PathBuf,

    /// Row stride alignment of the buffer, in bytes.
    #[arg(long, default_value_t = DEFAULT_ROW_ALIGNMENT)]
    row_alignment: usize,

    /// Indent the JSON output.
    #[arg(long)]
    pretty: bool,
}

#[derive(Parser, Debug)]
struct ExportArgs {
    /// Input JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,

    /// Row stride alignment to decode with; defaults to the stride recorded in the input.
    #[arg(long)]
    row_alignment: Option<usize>,
}

#[derive(Parser, Debug)]
struct InspectArgs {
    /// Input JSON.
    #[arg(long = "in")]
    in_path: PathBuf,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    match cli.cmd {
        Command::Import(args) => cmd_import(args),
        Command::Export(args) => cmd_export(args),
        Command::Inspect(args) => cmd_inspect(args),
    }
}

fn read_record(path: &Path) -> anyhow::Result<SerializedBuffer> {
    let f = File::open(path).with_context(|| format!("open buffer '{}'", path.display()))?;
    let record = SerializedBuffer::from_reader(BufReader::new(f))
        .with_context(|| format!("parse buffer JSON '{}'", path.display()))?;
    Ok(record)
}

fn create_parent_dir(path: &Path) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    Ok(())
}

fn cmd_import(args: ImportArgs) -> anyhow::Result<()> {
    let img = image::open(&args.in_path)
        .with_context(|| format!("open image '{}'", args.in_path.display()))?
        .to_rgba8();
    let (width, height) = (img.width() as usize, img.height() as usize);

    let alloc = HeapAllocator::with_row_alignment(args.row_alignment);
    let mut buf = alloc.create_buffer(width, height, PixelFormat::RGBA32, None)?;
    {
        let mut guard = buf.lock_write()?;
        let stride = guard.buffer().bytes_per_row();
        let dst = guard
            .bytes_mut(Region::Whole)
            .context("buffer memory is not writable")?;
        pixelbuf::copy_rows(img.as_raw(), width * 4, dst, stride, height);
    }

    let record = pixelbuf::encode(&buf)?;

    create_parent_dir(&args.out)?;
    let f = File::create(&args.out)
        .with_context(|| format!("create '{}'", args.out.display()))?;
    let mut w = BufWriter::new(f);
    if args.pretty {
        w.write_all(record.to_json_pretty()?.as_bytes())?;
    } else {
        record.to_writer(&mut w)?;
    }
    w.flush()
        .with_context(|| format!("write '{}'", args.out.display()))?;

    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn cmd_export(args: ExportArgs) -> anyhow::Result<()> {
    let record = read_record(&args.in_path)?;
    let (color, bytes_per_pixel) = match record.pixel_format {
        PixelFormat::RGBA32 => (image::ColorType::Rgba8, 4),
        PixelFormat::ONE_COMPONENT_8 => (image::ColorType::L8, 1),
        other => anyhow::bail!("cannot export pixel format {other} as PNG (only RGBA and L008)"),
    };

    let row_alignment = args
        .row_alignment
        .or_else(|| recorded_stride(&record))
        .unwrap_or(DEFAULT_ROW_ALIGNMENT);
    let buf = record
        .decode(&HeapAllocator::with_row_alignment(row_alignment))
        .with_context(|| format!("decode '{}'", args.in_path.display()))?;
    let (width, height) = (buf.width(), buf.height());

    let row = width * bytes_per_pixel;
    let mut tight = vec![0u8; row * height];
    {
        let guard = buf.lock_read()?;
        let src = guard
            .bytes(Region::Whole)
            .context("buffer memory is not readable")?;
        pixelbuf::copy_rows(src, buf.bytes_per_row(), &mut tight, row, height);
    }

    create_parent_dir(&args.out)?;
    image::save_buffer_with_format(
        &args.out,
        &tight,
        u32::try_from(width).context("width exceeds u32")?,
        u32::try_from(height).context("height exceeds u32")?,
        color,
        image::ImageFormat::Png,
    )
    .with_context(|| format!("write png '{}'", args.out.display()))?;

    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn cmd_inspect(args: InspectArgs) -> anyhow::Result<()> {
    let record = read_record(&args.in_path)?;

    println!("format:  {} ({})", record.pixel_format, record.pixel_format.0);
    println!("size:    {}x{}", record.width, record.height);
    println!(
        "planar:  {}{}",
        record.planar(),
        if record.is_planar.is_none() {
            " (legacy record)"
        } else {
            ""
        }
    );
    if let Some(planes) = &record.planes {
        println!("planes:  {}", record.plane_count);
        for (i, plane) in planes.iter() {
            println!(
                "  {i}: {} bytes, stride {}, height {}",
                plane.data.as_ref().map_or(0, |d| d.len()),
                or_dash(plane.bytes_per_row),
                or_dash(plane.height)
            );
        }
    }
    if let Some(data) = &record.data {
        println!(
            "data:    {} bytes, stride {}",
            data.len(),
            or_dash(recorded_stride(&record))
        );
    }
    println!("payload: {} bytes", record.payload_len());
    Ok(())
}

/// Row stride the record was written with. Non-planar records carry no stride key, so it is
/// derived from the blob length.
fn recorded_stride(record: &SerializedBuffer) -> Option<usize> {
    if let Some(data) = &record.data {
        return (record.height > 0 && data.len() % record.height == 0)
            .then(|| data.len() / record.height);
    }
    record.planes.as_ref()?.get(0)?.bytes_per_row
}

fn or_dash(v: Option<usize>) -> String {
    v.map_or_else(|| "-".to_string(), |v| v.to_string())
}
