use html2deck_core::emit::{ImageSource, TextOptions};
use html2deck_core::layout::LayoutNode;
use html2deck_core::model::{Rect, ShapeKind};
use html2deck_core::{
    convert, convert_with, ConvertConfig, DrawCall, DrawCallEncoder, Error, FontBook, LayoutEngine,
    RenderingEngine, SlideDocument, TinySkiaSurface,
};
use std::path::PathBuf;

async fn run(html: &str, config: &ConvertConfig) -> (SlideDocument, Vec<DrawCall>) {
    let mut engine = LayoutEngine::new(config.viewport_width, config.viewport_height);
    let mut encoder = DrawCallEncoder::new();
    let surface = TinySkiaSurface::with_fonts(FontBook::load(&config.icon_font_paths, config.system_fonts));
    let doc = convert_with(&mut engine, &surface, &mut encoder, html, config)
        .await
        .unwrap();
    (doc, encoder.into_calls())
}

fn embedded_mimes(calls: &[DrawCall]) -> Vec<&str> {
    calls
        .iter()
        .filter_map(|c| match c {
            DrawCall::AddImage { options } => match &options.source {
                ImageSource::Embedded { mime, .. } => Some(mime.as_str()),
                ImageSource::Url { .. } => None,
            },
            _ => None,
        })
        .collect()
}

fn frame(call: &DrawCall) -> Option<Rect> {
    match call {
        DrawCall::AddText { options, .. } | DrawCall::AddList { options, .. } => Some(options.frame),
        DrawCall::AddImage { options } => Some(options.frame),
        DrawCall::AddShape { options, .. } => Some(options.frame),
        DrawCall::AddTable { options, .. } => Some(options.frame),
        DrawCall::AddSlide { .. } | DrawCall::SetBackground { .. } => None,
    }
}

fn texts(calls: &[DrawCall]) -> Vec<(&str, &TextOptions)> {
    calls
        .iter()
        .filter_map(|c| match c {
            DrawCall::AddText { text, options } => Some((text.as_str(), options)),
            _ => None,
        })
        .collect()
}

#[tokio::test]
async fn test_round_square_and_gradient_box() {
    let html = r#"
    <html><body style="margin:0">
      <div class="slide" style="width:1280px;height:720px">
        <div style="width:100px;height:100px;border-radius:50px;background:#3b82f6"></div>
        <div style="width:300px;height:100px;background:linear-gradient(to right, #10b981, #059669)"></div>
      </div>
    </body></html>
    "#;
    let (_, calls) = run(html, &ConvertConfig::default()).await;

    let shapes: Vec<&ShapeKind> = calls
        .iter()
        .filter_map(|c| match c {
            DrawCall::AddShape { shape, .. } => Some(shape),
            _ => None,
        })
        .collect();
    assert_eq!(shapes, vec![&ShapeKind::Ellipse]);

    assert_eq!(embedded_mimes(&calls), vec!["image/png"]);
}

/// The calls between the `index`th slide marker and the next one.
fn slide_calls(calls: &[DrawCall], index: usize) -> &[DrawCall] {
    let starts: Vec<usize> = calls
        .iter()
        .enumerate()
        .filter(|(_, c)| matches!(c, DrawCall::AddSlide { .. }))
        .map(|(i, _)| i)
        .collect();
    let end = starts.get(index + 1).copied().unwrap_or(calls.len());
    &calls[starts[index]..end]
}

#[tokio::test]
async fn test_single_edge_border_keeps_its_accent() {
    let html = r#"
      <div class="slide" style="width:1280px;height:720px">
        <div style="width:300px;height:100px;border-left:6px solid #3b82f6"><p>Card</p></div>
      </div>
    "#;
    let (_, calls) = run(html, &ConvertConfig::default()).await;

    let accents: Vec<Rect> = calls
        .iter()
        .filter_map(|c| match c {
            DrawCall::AddShape { shape: ShapeKind::Rect, options }
                if options.fill.as_deref() == Some("3B82F6") =>
            {
                Some(options.frame)
            }
            _ => None,
        })
        .collect();
    assert_eq!(accents.len(), 1);
    assert!((accents[0].w - 0.0625).abs() < 1e-4);
    // the card height follows the 0.75 fit scale, the stroke keeps its 4.5pt
    assert!((accents[0].h - 100.0 / 96.0 * 0.75).abs() < 1e-3);
}

#[tokio::test]
async fn test_hidden_slides_keep_their_flow() {
    let html = r#"
    <html><head><style>
      .slide { display: none; width: 1280px; height: 720px }
      .slide.active { display: block }
    </style></head><body style="margin:0">
      <div class="slide active"><h1>Intro</h1><p>first</p></div>
      <div class="slide"><h1>Details</h1><p>second slide body</p></div>
    </body></html>
    "#;
    let (doc, calls) = run(html, &ConvertConfig::default()).await;
    assert_eq!(doc.slides.len(), 2);

    let second = texts(slide_calls(&calls, 1));
    let heading = second.iter().find(|(t, _)| *t == "Details").unwrap().1.frame;
    let body = second.iter().find(|(t, _)| *t == "second slide body").unwrap().1.frame;
    assert!(heading.h > 0.0);
    assert!(heading.y + heading.h <= body.y + 1e-3);
}

#[tokio::test]
async fn test_three_slides_in_source_order() {
    let html = r#"
      <div class="slide"><h1>Alpha</h1><p>one</p></div>
      <div class="slide"><h1>Beta</h1><p>two</p></div>
      <div class="slide"><h1>Gamma</h1><p>three</p></div>
    "#;
    let (doc, calls) = run(html, &ConvertConfig::default()).await;
    assert_eq!(doc.slides.len(), 3);

    let slides: Vec<&str> = calls
        .iter()
        .filter_map(|c| match c {
            DrawCall::AddSlide { title } => Some(title.as_str()),
            _ => None,
        })
        .collect();
    assert_eq!(slides, vec!["Alpha", "Beta", "Gamma"]);
}

#[tokio::test]
async fn test_icon_names_never_reach_text() {
    let html = r#"
      <div class="slide">
        <p><i class="material-icons">home</i> Home page</p>
        <span class="material-icons">rocket_launch</span>
        <i class="fa-solid fa-star"></i>
      </div>
    "#;
    let config = ConvertConfig {
        system_fonts: false,
        ..ConvertConfig::default()
    };
    let (doc, calls) = run(html, &config).await;

    let emitted: Vec<&str> = texts(&calls).into_iter().map(|(t, _)| t).collect();
    assert_eq!(emitted, vec!["Home page"]);

    // without fonts, home and star have vector stand-ins; rocket_launch has none and is dropped
    assert_eq!(embedded_mimes(&calls), vec!["image/svg+xml", "image/svg+xml"]);

    let mut icons = 0;
    for slide in &doc.slides {
        for el in &slide.elements {
            let mut stack = vec![el];
            while let Some(e) = stack.pop() {
                if e.is_icon() {
                    icons += 1;
                    assert!(e.text.is_empty());
                }
                stack.extend(&e.children);
            }
        }
    }
    assert_eq!(icons, 3);
}

#[tokio::test]
async fn test_icon_font_glyphs_become_png() {
    let Some(font) = ["/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf", "/usr/share/fonts/TTF/DejaVuSans.ttf"]
        .into_iter()
        .map(PathBuf::from)
        .find(|p| p.is_file())
    else {
        return;
    };
    let html = r#"
      <div class="slide">
        <span class="material-icons" style="font-size:40px">rocket_launch</span>
        <span class="material-icons" style="font-size:40px;color:#2563eb">analytics</span>
      </div>
    "#;
    let config = ConvertConfig {
        icon_font_paths: vec![font],
        system_fonts: false,
        ..ConvertConfig::default()
    };
    let (_, calls) = run(html, &config).await;
    assert_eq!(embedded_mimes(&calls), vec!["image/png", "image/png"]);
    assert!(texts(&calls).is_empty());
}

#[tokio::test]
async fn test_everything_lands_on_the_canvas() {
    let mut blocks = String::new();
    for i in 0..8 {
        blocks.push_str(&format!(
            r#"<div style="width:{}px;height:200px;background:#222"><p>Block {i}</p></div>"#,
            600 + i * 400
        ));
    }
    let html = format!(r#"<div class="slide" style="width:1280px">{blocks}</div>"#);

    for aspect in ["16:9", "4:3", "wide"] {
        let config = ConvertConfig {
            aspect_ratio: aspect.parse().unwrap(),
            ..ConvertConfig::default()
        };
        let (w, h) = config.target_size();
        let (_, calls) = run(&html, &config).await;
        let frames: Vec<Rect> = calls.iter().filter_map(frame).collect();
        assert!(frames.len() >= 16);
        for r in frames {
            assert!(r.x >= 0.0 && r.y >= 0.0, "{aspect}: origin off canvas {r:?}");
            assert!(r.x + r.w <= w + 1e-3, "{aspect}: overflows width {r:?}");
            assert!(r.y + r.h <= h + 1e-3, "{aspect}: overflows height {r:?}");
            assert!(r.w > 0.0 && r.h > 0.0);
        }
    }
}

#[tokio::test]
async fn test_font_sizes_are_not_scaled() {
    let html = r#"<div class="slide"><p style="font-size:32px">Big</p></div>"#;
    for aspect in ["16:9", "4:3"] {
        let config = ConvertConfig {
            aspect_ratio: aspect.parse().unwrap(),
            ..ConvertConfig::default()
        };
        let (_, calls) = run(html, &config).await;
        let (_, options) = texts(&calls)[0];
        assert_eq!(options.font_size_pt, 24.0);
    }
}

#[tokio::test]
async fn test_script_driven_deck() {
    let html = r#"
    <html><head><style>h1 { color: #ff0000; }</style></head>
    <body><div id="deck"></div>
    <script>
      const slides = [
        { title: 'a', html: '<h1>First</h1><p>from script</p>' },
        { title: 'b', html: `<h1>Second</h1>` },
      ];
      document.getElementById('deck').innerHTML = slides[0].html;
    </script></body></html>
    "#;
    let (doc, calls) = run(html, &ConvertConfig::default()).await;
    let titles: Vec<&str> = doc.slides.iter().map(|s| s.title.as_str()).collect();
    assert_eq!(titles, vec!["First", "Second"]);

    let (_, heading) = texts(&calls)[0];
    assert_eq!(heading.color.as_deref(), Some("FF0000"));
}

#[tokio::test]
async fn test_animations_can_be_dropped() {
    let html = r#"<div class="slide"><h1 style="animation: fadeInUp 0.8s ease-out 0.2s">Hi</h1></div>"#;
    let (_, calls) = run(html, &ConvertConfig::default()).await;
    let animation = texts(&calls)[0].1.animation.clone().unwrap();
    assert_eq!(animation.duration_ms, 800);
    assert_eq!(animation.delay_ms, 200);

    let config = ConvertConfig {
        preserve_animations: false,
        ..ConvertConfig::default()
    };
    let (_, calls) = run(html, &config).await;
    assert!(texts(&calls)[0].1.animation.is_none());
}

#[tokio::test]
async fn test_serialized_output_is_json() {
    let bytes = convert(r#"<div class="slide"><h1>Deck</h1></div>"#, &ConvertConfig::default())
        .await
        .unwrap();
    let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(json["title"], "Deck");
    assert_eq!(json["calls"][0]["op"], "add_slide");
}

/// Wraps the built-in engine but never reports fonts as ready.
struct SlowFonts(LayoutEngine);

impl RenderingEngine for SlowFonts {
    async fn load(&mut self, html: &str) -> html2deck_core::Result<LayoutNode> {
        self.0.load(html).await
    }

    fn canvas_size(&self) -> (f32, f32) {
        self.0.canvas_size()
    }

    async fn fonts_ready(&self) {
        std::future::pending::<()>().await
    }
}

#[tokio::test]
async fn test_font_wait_is_bounded() {
    let config = ConvertConfig {
        font_ready_timeout_ms: 20,
        ..ConvertConfig::default()
    };
    let mut engine = SlowFonts(LayoutEngine::default());
    let mut encoder = DrawCallEncoder::new();
    let html = r#"<div class="slide"><span class="material-icons">check</span></div>"#;
    let doc = convert_with(&mut engine, &TinySkiaSurface::default(), &mut encoder, html, &config)
        .await
        .unwrap();
    assert_eq!(doc.slides.len(), 1);
    assert!(encoder
        .calls()
        .iter()
        .any(|c| matches!(c, DrawCall::AddImage { .. })));
}

/// An engine whose frame never opens.
struct BrokenEngine;

impl RenderingEngine for BrokenEngine {
    async fn load(&mut self, _html: &str) -> html2deck_core::Result<LayoutNode> {
        Err(Error::CollaboratorUnavailable("frame did not open".into()))
    }

    fn canvas_size(&self) -> (f32, f32) {
        (1280.0, 720.0)
    }

    async fn fonts_ready(&self) {}
}

#[tokio::test]
async fn test_engine_failure_is_fatal_and_emits_nothing() {
    let mut encoder = DrawCallEncoder::new();
    let err = convert_with(
        &mut BrokenEngine,
        &TinySkiaSurface::default(),
        &mut encoder,
        "<p>x</p>",
        &ConvertConfig::default(),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, Error::CollaboratorUnavailable(_)));
    assert!(encoder.calls().is_empty());
}
