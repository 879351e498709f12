use anyhow::Context;
use clap::Parser;
use std::fs;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;
use tubeforge::{Config, Container, Fetcher, FormatDescriptor, LookupMode, VideoMetadata};

#[derive(Parser)]
#[command(
    name = "tubeforge",
    version,
    about = "Look up YouTube videos and pick a format to download",
    long_about = "Resolve a YouTube URL, fetch its title and downloadable formats,\n\
    and hand back the URL for the chosen container and quality.\n\n\
    Examples:\n\
      tubeforge https://youtu.be/dQw4w9WgXcQ -F                 # List available formats\n\
      tubeforge https://youtu.be/dQw4w9WgXcQ -i                 # Show info only\n\
      tubeforge https://youtu.be/dQw4w9WgXcQ -q 720p            # Print the 720p mp4 URL\n\
      tubeforge https://youtu.be/dQw4w9WgXcQ -f mp3 -q 192kbps  # Print the 192kbps mp3 URL\n\
      tubeforge https://youtu.be/dQw4w9WgXcQ -m direct -F       # Read formats from the watch page\n\
      tubeforge https://youtu.be/dQw4w9WgXcQ -q 720p --save -d ./videos"
)]
struct Args {
    /// YouTube URL to look up
    #[arg(default_value = "")]
    url: String,

    /// Metadata source
    #[arg(short = 'm', long = "mode", help = "Metadata source: live or direct")]
    mode: Option<LookupMode>,

    /// List all available formats without selecting one
    #[arg(short = 'F', long = "list-formats")]
    list_formats: bool,

    /// Show title and format count only
    #[arg(short = 'i', long = "info-only")]
    info_only: bool,

    /// Container to select (mp4, webm, m4a, mp3)
    #[arg(short = 'f', long = "format", default_value = "mp4")]
    format: Container,

    /// Quality label to select, e.g. 720p or 192kbps
    #[arg(short = 'q', long = "quality")]
    quality: Option<String>,

    /// Download the selected format instead of printing its URL
    #[arg(long = "save")]
    save: bool,

    /// Download to specified directory
    #[arg(short = 'd', long = "dir")]
    output_dir: Option<PathBuf>,

    /// Output filename
    #[arg(short = 'o', long = "output")]
    output_name: Option<String>,

    /// Config file (defaults to $TUBEFORGE_CONFIG)
    #[arg(short = 'c', long = "config")]
    config: Option<PathBuf>,
}

fn init_logging() {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn,tubeforge=info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();
}

fn list_available_formats(metadata: &VideoMetadata) {
    println!("Available formats:");
    println!();

    for (index, format) in metadata.formats().iter().enumerate() {
        println!("[{}]: {}", index + 1, format.label());
        println!("  Container: {}", format.container);
        println!("  Quality: {}", format.quality);
        println!("  URL: {}", format.url);
        println!();
    }
}

fn display_video_info(metadata: &VideoMetadata) {
    println!("Title: {}", metadata.title());
    println!("Video ID: {}", metadata.id());
    println!("Formats: {}", metadata.formats().len());
}

fn get_filename(
    metadata: &VideoMetadata,
    format: &FormatDescriptor,
    output_name: Option<&str>,
) -> String {
    let base_name = match output_name {
        // Keep the given stem, the extension follows the container
        Some(name) => Path::new(name)
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("video")
            .to_string(),
        None => sanitize_filename::sanitize(metadata.title()),
    };
    format!("{}{}", base_name, format.container.extension())
}

async fn save_format(
    metadata: &VideoMetadata,
    format: &FormatDescriptor,
    config: &Config,
    args: &Args,
) -> anyhow::Result<PathBuf> {
    let binary = tubeforge::download_format(format, config).await?;

    let filename = get_filename(metadata, format, args.output_name.as_deref());
    let path = match &args.output_dir {
        Some(dir) => {
            fs::create_dir_all(dir)
                .with_context(|| format!("creating {}", dir.display()))?;
            dir.join(&filename)
        }
        None => Path::new(".").join(&filename),
    };

    fs::write(&path, binary).with_context(|| format!("writing {}", path.display()))?;
    Ok(path)
}

fn fail(message: &str) -> ! {
    eprintln!("✗ {}", message);
    std::process::exit(1);
}

#[tokio::main]
async fn main() {
    let args = Args::parse();
    init_logging();

    if args.url.trim().is_empty() {
        fail("Please enter a YouTube URL");
    }

    if !tubeforge::is_valid(&args.url) {
        fail("Please enter a valid YouTube URL");
    }

    let mut config = match Config::resolve(args.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };
    if let Some(mode) = args.mode {
        config.mode = mode;
    }

    let fetcher = match Fetcher::from_config(&config) {
        Ok(fetcher) => fetcher,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    let metadata = match fetcher.fetch_metadata(&args.url).await {
        Ok(metadata) => metadata,
        Err(e) => {
            tracing::error!("{}", e);
            fail("Failed to process video");
        }
    };
    println!("✓ Found video: {}", metadata.title());

    if args.list_formats {
        list_available_formats(&metadata);
        return;
    }

    if args.info_only {
        display_video_info(&metadata);
        return;
    }

    let Some(quality) = args.quality.as_deref() else {
        let available = metadata.qualities(args.format);
        eprintln!("Available {} qualities: {}", args.format, available.join(", "));
        fail("Please select a quality");
    };

    let format = match metadata.select(args.format, quality) {
        Ok(format) => format,
        Err(e) => {
            tracing::debug!("{}", e);
            fail("Selected format not available");
        }
    };

    if !args.save {
        println!("{}: {}", format.label(), format.url);
        return;
    }

    println!("Downloading {}...", format.label());
    match save_format(&metadata, format, &config, &args).await {
        Ok(path) => println!("✓ Saved to: {}", path.display()),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            fail("Download failed");
        }
    }
}
