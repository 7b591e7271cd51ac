use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use html2deck_core::{build_document, AspectRatio, ConvertConfig, Element, LayoutEngine, SlideDocument};
use std::io::{Read, Write};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "html2deck", about = "Compile HTML slide decks into presentation draw calls")]
struct Cli {
    /// Log debug output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert an HTML deck and write the serialized draw calls
    Convert {
        /// The HTML file to convert (use - for stdin)
        input: String,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// JSON config file; flags override its values
        #[arg(long)]
        config: Option<PathBuf>,

        /// Slide size preset: 16:9, 16:10, 4:3 or wide
        #[arg(long)]
        aspect: Option<AspectRatio>,

        #[arg(long)]
        title: Option<String>,

        #[arg(long)]
        author: Option<String>,

        /// Drop animations and transitions
        #[arg(long)]
        no_animations: bool,

        /// Rendering viewport as WxH (default: 1280x720)
        #[arg(long)]
        viewport: Option<String>,

        /// Font file for glyph icons (repeatable)
        #[arg(long = "icon-font")]
        icon_fonts: Vec<PathBuf>,

        /// Never look up icon fonts among installed system fonts
        #[arg(long)]
        no_system_fonts: bool,
    },
    /// Print the extracted slide tree
    Inspect {
        /// The HTML file to inspect (use - for stdin)
        input: String,

        /// Output as JSON instead of an outline
        #[arg(long)]
        json: bool,

        #[arg(long)]
        config: Option<PathBuf>,
    },
}

fn parse_viewport(s: &str) -> Result<(f32, f32)> {
    let (w, h) = s
        .split_once('x')
        .with_context(|| format!("viewport `{s}` is not WxH"))?;
    let w = w.trim().parse().with_context(|| format!("bad viewport width `{w}`"))?;
    let h = h.trim().parse().with_context(|| format!("bad viewport height `{h}`"))?;
    Ok((w, h))
}

fn read_input(input: &str) -> Result<String> {
    if input == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("failed to read stdin")?;
        Ok(buf)
    } else {
        std::fs::read_to_string(input).with_context(|| format!("failed to read {input}"))
    }
}

fn load_config(path: Option<&PathBuf>) -> Result<ConvertConfig> {
    match path {
        Some(path) => ConvertConfig::from_json_file(path)
            .with_context(|| format!("failed to load config {}", path.display())),
        None => Ok(ConvertConfig::default()),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let level = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    match cli.command {
        Commands::Convert {
            input,
            output,
            config,
            aspect,
            title,
            author,
            no_animations,
            viewport,
            icon_fonts,
            no_system_fonts,
        } => {
            let mut config = load_config(config.as_ref())?;
            if let Some(aspect) = aspect {
                config.aspect_ratio = aspect;
            }
            if let Some(title) = title {
                config.title = title;
            }
            if let Some(author) = author {
                config.author = author;
            }
            if no_animations {
                config.preserve_animations = false;
            }
            if let Some(viewport) = viewport {
                (config.viewport_width, config.viewport_height) = parse_viewport(&viewport)?;
            }
            config.icon_font_paths.extend(icon_fonts);
            if no_system_fonts {
                config.system_fonts = false;
            }

            let html = read_input(&input)?;
            let bytes = html2deck_core::convert(&html, &config)
                .await
                .context("conversion failed")?;
            match output {
                Some(path) => std::fs::write(&path, &bytes)
                    .with_context(|| format!("failed to write {}", path.display()))?,
                None => {
                    let mut stdout = std::io::stdout().lock();
                    stdout.write_all(&bytes)?;
                    stdout.write_all(b"\n")?;
                }
            }
        }
        Commands::Inspect { input, json, config } => {
            let config = load_config(config.as_ref())?;
            let html = read_input(&input)?;
            let mut engine = LayoutEngine::new(config.viewport_width, config.viewport_height);
            let doc = build_document(&mut engine, &html, &config)
                .await
                .context("extraction failed")?;
            if json {
                println!("{}", serde_json::to_string_pretty(&doc)?);
            } else {
                print_outline(&doc);
            }
        }
    }
    Ok(())
}

fn print_outline(doc: &SlideDocument) {
    println!("slides: {}", doc.slides.len());
    for (i, slide) in doc.slides.iter().enumerate() {
        println!("---");
        println!("#{} {}", i + 1, slide.title);
        for el in &slide.elements {
            print_element(el, 1);
        }
    }
}

fn print_element(el: &Element, depth: usize) {
    let g = el.geometry;
    let kind = serde_json::to_value(&el.kind)
        .ok()
        .and_then(|v| v.get("type").and_then(|t| t.as_str()).map(str::to_string))
        .unwrap_or_default();
    let mut line = format!(
        "{:indent$}{kind} <{}> [{:.0},{:.0} {:.0}x{:.0}]",
        "",
        el.tag,
        g.x,
        g.y,
        g.w,
        g.h,
        indent = depth * 2
    );
    if !el.text.is_empty() {
        line.push_str(&format!(" {:?}", el.text));
    }
    if let Some(anim) = &el.animation {
        line.push_str(&format!(" ~{:?}", anim.archetype));
    }
    println!("{line}");
    for child in &el.children {
        print_element(child, depth + 1);
    }
}
