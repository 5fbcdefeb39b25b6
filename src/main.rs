use clap::Parser;
use imagegallery_diff::{config, manifest, output, pipeline};
use std::path::PathBuf;

fn version_string() -> &'static str {
    let on_tag = env!("ON_RELEASE_TAG");
    if on_tag == "true" {
        env!("CARGO_PKG_VERSION")
    } else {
        let hash = env!("GIT_HASH");
        if hash.is_empty() {
            "dev@unknown"
        } else {
            // Leaked once at startup
            Box::leak(format!("dev@{hash}").into_boxed_str())
        }
    }
}

#[derive(Parser)]
#[command(name = "imagegallery-diff")]
#[command(about = "Report new, removed, and visually changed images between two gallery manifests")]
#[command(long_about = "\
Report new, removed, and visually changed images between two gallery manifests

Images are matched by title. Matched pairs are downloaded and compared pixel
by pixel; any pair with differing pixels is reported as changed.

Input formats:

  target.json   {\"images\": [{\"title\": ..., \"url\": ...}, ...]}
  base.json     [{\"contents\": {\"images\": [...]}}, ...]   (only the first snapshot is read)

Output:

  {\"changed\": [{\"target\": ..., \"base\": ...}], \"new\": [...], \"removed\": [...]}

Run 'imagegallery-diff --gen-config' to print a documented settings file.")]
#[command(version = version_string())]
struct Cli {
    /// The newly created image gallery file
    #[arg(short, long)]
    target: Option<PathBuf>,

    /// The base image gallery file to compare against
    #[arg(short, long)]
    base: Option<PathBuf>,

    /// The output file to create
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Settings file (TOML); stock defaults are used when omitted
    #[arg(long)]
    config: Option<PathBuf>,

    /// Write a diff visualisation PNG for each changed image into this directory
    #[arg(long)]
    diff_dir: Option<PathBuf>,

    /// Print a stock settings file with all options documented, then exit
    #[arg(long)]
    gen_config: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    if cli.gen_config {
        print!("{}", config::stock_config_toml());
        return Ok(());
    }

    let (Some(target_path), Some(base_path), Some(output_path)) =
        (cli.target, cli.base, cli.output)
    else {
        println!("Missing parameters, unable to continue");
        std::process::exit(1);
    };

    let diff_config = config::load_config(cli.config.as_deref())?;
    let target = manifest::load_target(&target_path)?;
    let base = manifest::load_base(&base_path)?;

    let (tx, rx) = std::sync::mpsc::channel();
    let printer = std::thread::spawn(move || {
        for event in rx {
            for line in output::format_diff_event(&event) {
                println!("{}", line);
            }
        }
    });
    let result = pipeline::run(&diff_config, &target, &base, cli.diff_dir, Some(tx));
    printer
        .join()
        .map_err(|_| "progress printer thread panicked")?;
    let report = result?;

    output::print_summary(&report);

    let json = serde_json::to_string(&report)?;
    std::fs::write(&output_path, json)?;

    Ok(())
}
