use clap::{Parser, Subcommand};
use std::path::PathBuf;
use weft::format::FormatterRegistry;
use weft::generate::SiteGenerator;
use weft::render::{HelperTable, TemplateRenderer};
use weft::store::MemoryStore;
use weft::write::SiteWriter;
use weft::{config, output};

#[derive(Parser)]
#[command(name = "weft")]
#[command(version)]
#[command(about = "Static site generator with JSON front matter and layout inheritance")]
#[command(long_about = "\
Static site generator with JSON front matter and layout inheritance

Content files open with an optional JSON metadata block; the rest is the
template body. Pages inherit from layouts through the `layout` key, and
layouts nest to any depth via {{ yield }}.

Project structure:

  site/
  ├── config.toml              # Site config (optional)
  ├── content/
  │   ├── index.html           # Page
  │   ├── about.md             # Markdown page
  │   ├── posts/
  │   │   └── 2018-06-23-hello.md   # Dated by filename prefix
  │   └── css/style.css        # Asset, copied through
  ├── layouts/
  │   ├── article.md           # Wraps posts, inherits from main
  │   └── main.html            # Terminal layout
  └── components/
      └── card.html            # Fragment: {{ component \"card\" }}

Front matter keys with built-in meaning:
  layout      Parent layout name (default from config.toml)
  title       Page title; derived from the filename when absent
  permalink   Explicit output location, overrides the title slug
  published   false = draft, skipped unless --drafts is set")]
struct Cli {
    /// Project root directory
    #[arg(long, default_value = ".", global = true)]
    root: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Generate the site and write it to the output directory
    Build {
        /// Include pages marked "published": false
        #[arg(long)]
        drafts: bool,
    },
    /// Generate and render everything without writing output
    Check,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Command::Build { drafts } => {
            let mut config = config::load_config(&cli.root)?;
            if drafts {
                config.include_drafts = true;
            }

            let mut generator = SiteGenerator::new(Vec::new());
            let generated = generator.run(&cli.root, &config)?;
            output::print_generation(&generated.site);

            let renderer = TemplateRenderer::new(
                FormatterRegistry::with_defaults(),
                HelperTable::new(),
                generated.components,
                Box::new(MemoryStore::new()),
            );
            let writer = SiteWriter::new(renderer, Vec::new());

            let mut site = generated.site;
            let report = writer.write(&mut site)?;
            output::print_write(&report, &config.output_path(&cli.root));
        }
        Command::Check => {
            let config = config::load_config(&cli.root)?;

            let mut generator = SiteGenerator::new(Vec::new());
            let generated = generator.run(&cli.root, &config)?;
            output::print_generation(&generated.site);

            let renderer = TemplateRenderer::new(
                FormatterRegistry::with_defaults(),
                HelperTable::new(),
                generated.components,
                Box::new(MemoryStore::new()),
            );
            let writer = SiteWriter::new(renderer, Vec::new());
            let rendered = writer.render_only(&generated.site)?;
            println!("Rendered {rendered} pages; site is valid");
        }
    }

    Ok(())
}
