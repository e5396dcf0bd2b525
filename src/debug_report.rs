use entity_recognizer::{Detection, Entity, EntityKind, RecognizerConfig, StageMetrics};

mod ansi {
    pub const RESET: &str = "\x1b[0m";
    pub const DIM: &str = "\x1b[2m";
    pub const BOLD: &str = "\x1b[1m";

    pub const GREEN: &str = "\x1b[32m";
    pub const YELLOW: &str = "\x1b[33m";
    pub const BLUE: &str = "\x1b[34m";
    pub const MAGENTA: &str = "\x1b[35m";
    pub const CYAN: &str = "\x1b[36m";
    pub const GRAY: &str = "\x1b[90m";

    pub struct Palette {
        enabled: bool,
    }

    impl Palette {
        pub fn new(enabled: bool) -> Self {
            Self { enabled }
        }

        pub fn paint(&self, s: impl AsRef<str>, color: &str) -> String {
            if self.enabled { format!("{}{}{}", color, s.as_ref(), RESET) } else { s.as_ref().to_string() }
        }

        pub fn bold(&self, s: impl AsRef<str>) -> String {
            if self.enabled { format!("{}{}{}", BOLD, s.as_ref(), RESET) } else { s.as_ref().to_string() }
        }

        pub fn dim(&self, s: impl AsRef<str>) -> String {
            if self.enabled { format!("{}{}{}", DIM, s.as_ref(), RESET) } else { s.as_ref().to_string() }
        }
    }
}

pub fn print_run(input: &str, detection: &Detection, config: &RecognizerConfig, metrics: bool, color: bool) {
    let palette = ansi::Palette::new(color);
    println!("\n{}", palette.bold(palette.paint(format!("⚙  Scanning: \"{}\"", input.trim_end()), ansi::CYAN)));
    println!(
        "  {} {}  {} {}",
        palette.dim("locale:"),
        palette.paint(&config.locale, ansi::BLUE),
        palette.dim("│ region:"),
        palette.paint(&config.region, ansi::BLUE),
    );

    println!("\n{}", palette.paint("━━━ Entities ━━━", ansi::GRAY));
    if detection.entities.is_empty() {
        println!("{}", palette.dim("  No entities found"));
        println!("\n{}", palette.paint("Possible reasons:", ansi::YELLOW));
        println!("  • No rule data for this locale/region (check --rules)");
        println!("  • Phone numbers need a numbering-plan library (build with --features phonenumber)");
        println!("  • Matches were removed by clear or past rules");
        println!("\n{}", palette.dim("  Tip: Set RUST_LOG=entity_recognizer=debug to see skipped rules"));
    } else {
        print_entities(&detection.entities, &palette);
    }

    if metrics {
        println!("\n{}", palette.paint("━━━ Stages ━━━", ansi::GRAY));
        let m = &detection.metrics;
        print_stage("phone", &m.phone, &palette);
        print_stage("date primary", &m.date.primary, &palette);
        print_stage("date clear", &m.date.clear, &palette);
        print_stage("date past", &m.date.past, &palette);
        print_stage("date filter", &m.date.filter, &palette);
    }

    println!("\n{}", palette.paint("━━━ Timing ━━━", ansi::GRAY));
    println!(
        "  Total: {}  │  Phone: {}  │  Date: {}  │  Normalize: {}",
        palette.paint(format!("{:?}", detection.metrics.total), ansi::GREEN),
        palette.paint(format!("{:?}", detection.metrics.phone.duration), ansi::CYAN),
        palette.paint(format!("{:?}", detection.metrics.date.total), ansi::CYAN),
        palette.dim(format!("{:?}", detection.metrics.normalize)),
    );
    println!();
}

fn print_entities(entities: &[Entity], palette: &ansi::Palette) {
    for (idx, ent) in entities.iter().enumerate() {
        let kind_color = match ent.kind {
            EntityKind::PhoneNumber => ansi::MAGENTA,
            EntityKind::Date => ansi::GREEN,
        };
        println!(
            "  {} {} {} {}",
            palette.paint(format!("[{}]", idx), ansi::GRAY),
            palette.bold(palette.paint(&ent.body, kind_color)),
            palette.dim("│"),
            palette.paint(format!("span {}..{}", ent.begin, ent.end), ansi::YELLOW),
        );
        let mut detail = format!("      {} {}", palette.dim("kind:"), palette.paint(ent.kind.as_ref(), ansi::BLUE));
        if let Some(date_kind) = ent.date_kind {
            detail.push_str(&format!("  {} {}", palette.dim("│ class:"), palette.paint(date_kind.as_ref(), ansi::BLUE)));
        }
        if let Some(rule) = &ent.rule {
            detail.push_str(&format!("  {} {}", palette.dim("│ rule:"), palette.paint(rule, ansi::CYAN)));
        }
        println!("{detail}");
    }
}

fn print_stage(label: &str, stage: &StageMetrics, palette: &ansi::Palette) {
    println!(
        "  {} {}  {}",
        palette.paint(format!("{label:<13}"), ansi::BLUE),
        if stage.produced > 0 {
            palette.paint(format!("✓ {} matches", stage.produced), ansi::GREEN)
        } else {
            palette.dim(format!("✗ {} matches", stage.produced))
        },
        palette.dim(format!("{:?}", stage.duration)),
    );
}
