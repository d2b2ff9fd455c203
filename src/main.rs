use catalog_render::breadcrumbs::CategoryTree;
use catalog_render::render::{self, RenderOptions};
use catalog_render::store::Store;
use catalog_render::{config, output};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Exit status of `render --strict` when the run produced warnings.
const EXIT_WARNINGS: i32 = 2;

fn version_string() -> &'static str {
    let on_tag = env!("ON_RELEASE_TAG");
    if on_tag == "true" {
        env!("CARGO_PKG_VERSION")
    } else {
        let hash = env!("GIT_HASH");
        if hash.is_empty() {
            "dev@unknown"
        } else {
            // Leaked once at startup.
            Box::leak(format!("dev@{hash}").into_boxed_str())
        }
    }
}

#[derive(Parser)]
#[command(name = "catalog-render")]
#[command(about = "Export a product catalog into a static site content tree")]
#[command(long_about = "\
Export a product catalog into a static site content tree

Reads categories, products, options and values from the SQLite catalog and
writes JSON front matter pages plus published images for a static site
generator.

Output structure:

  <output>/
  ├── content/
  │   ├── products/                      # products_root crumb
  │   │   └── living-areas/
  │   │       ├── _index.html            # category page, aggregated facets
  │   │       └── dining-room/
  │   │           ├── _index.html
  │   │           └── white-dining-table/
  │   │               └── index.html     # product page
  │   └── options/
  │       └── body-color/
  │           ├── _index.html            # option page
  │           └── ral9010/index.html     # value page
  └── static/
      ├── images/{categories,products,variations,values,transports}/
      │   └── resize/                    # WIDTHxHEIGHT variants
      └── files/

Category, option and value pages are created once and then only extended
with facets. Images are re-encoded only when the source mtime changes.

Run 'catalog-render gen-config' to generate a documented config.toml.")]
#[command(version = version_string())]
struct Cli {
    /// Path to config.toml; relative paths inside it are resolved against its directory
    #[arg(long, default_value = "config.toml", global = true)]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Export categories, products, options and assets
    Render {
        /// Delete the options subtree first so option pages are regenerated
        #[arg(long)]
        remove: bool,
        /// Exit with status 2 when the run completed with warnings
        #[arg(long)]
        strict: bool,
    },
    /// Validate config and category tree without writing output
    Check,
    /// Print a stock config.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Command::Render { remove, strict } => {
            let config = config::load_config(&cli.config)?;
            println!("==> Rendering {} → {}", config.database, config.output);

            let (tx, rx) = std::sync::mpsc::channel();
            let printer = std::thread::spawn(move || {
                for event in rx {
                    for line in output::format_render_event(&event) {
                        println!("{}", line);
                    }
                }
            });
            let result = render::render(&config, &RenderOptions { remove }, Some(tx));
            // The sender is dropped with the report or the error, ending the printer.
            if printer.join().is_err() {
                eprintln!("progress printer panicked");
            }
            let report = result?;
            output::print_render_output(&report);

            println!("==> Render complete: {}", config.output);
            if strict && report.has_warnings() {
                std::process::exit(EXIT_WARNINGS);
            }
        }
        Command::Check => {
            let config = config::load_config(&cli.config)?;
            println!("==> Checking {}", config.database);
            let store = Store::open(&config.database_path())?;
            let tree = CategoryTree::new(store.categories()?, &config.products_root);
            let failures = tree.check_all();
            output::print_check_output(&tree, &failures);
            if !failures.is_empty() {
                return Err(format!("{} categories cannot be resolved", failures.len()).into());
            }
            println!("==> Catalog is valid");
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}
