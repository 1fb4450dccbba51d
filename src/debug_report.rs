use saes_router::{LoadReport, Outcome, StepReport};

/// SGR codes for the report, applied by [`Paint`].
mod sgr {
    pub const DIM: &str = "2";
    pub const RED: &str = "31";
    pub const GREEN: &str = "32";
    pub const YELLOW: &str = "33";
    pub const BLUE: &str = "34";
    pub const BOLD_BLUE: &str = "1;34";
    pub const CYAN: &str = "36";
    pub const GRAY: &str = "90";
}

/// Wraps text in an SGR sequence, or passes it through when color is off.
#[derive(Clone, Copy)]
struct Paint(bool);

impl Paint {
    fn on(self, code: &str, text: impl AsRef<str>) -> String {
        match self {
            Paint(true) => format!("\x1b[{code}m{}\x1b[0m", text.as_ref()),
            Paint(false) => text.as_ref().to_string(),
        }
    }
}

/// Summary of what the registry skipped while loading. Printed once.
pub fn print_load(report: &LoadReport, rules: usize, color: bool) {
    let paint = Paint(color);
    eprintln!("{}", paint.on(sgr::GRAY, "━━━ Registry ━━━"));
    eprintln!(
        "  {} rules from {} providers",
        paint.on(sgr::GREEN, rules.to_string()),
        paint.on(sgr::BLUE, report.providers_loaded.to_string())
    );

    for failed in &report.failed_providers {
        eprintln!("  {} {}", paint.on(sgr::RED, "✗ provider"), failed);
    }
    for skipped in &report.invalid_patterns {
        let error = paint.on(sgr::DIM, skipped.error.to_string());
        eprintln!("  {} {} {}", paint.on(sgr::RED, "✗ pattern"), skipped.rule, error);
    }
    for dup in &report.duplicates {
        eprintln!("  {} {}", paint.on(sgr::YELLOW, "• duplicate"), dup);
    }
    for shadowed in &report.shadowed {
        eprintln!(
            "  {} {} {} {}",
            paint.on(sgr::YELLOW, "• shadowed"),
            shadowed.rule,
            paint.on(sgr::DIM, "by"),
            shadowed.by
        );
    }
    eprintln!();
}

/// Routing details of one turn, on stderr so replies stay clean on stdout.
pub fn print_step(report: &StepReport, color: bool) {
    let paint = Paint(color);
    eprintln!("{}", paint.on(sgr::GRAY, format!("━━━ Turn {} ━━━", report.turn)));
    eprintln!("  {} \"{}\"", paint.on(sgr::DIM, "normalized:"), paint.on(sgr::CYAN, &report.normalized));

    let outcome = match &report.outcome {
        Outcome::Matched(rule) => paint.on(sgr::GREEN, format!("✓ {rule}")),
        Outcome::Fallback => paint.on(sgr::YELLOW, "↺ fallback"),
        Outcome::Failed { rule: Some(rule), error } => paint.on(sgr::RED, format!("✗ {rule}: {error}")),
        Outcome::Failed { rule: None, error } => paint.on(sgr::RED, format!("✗ fallback: {error}")),
        Outcome::NoHandler => paint.on(sgr::RED, "✗ no handler"),
    };
    eprintln!("  {} {}", paint.on(sgr::DIM, "outcome:"), outcome);

    let transition = if report.state_before == report.state_after {
        paint.on(sgr::DIM, &report.state_after)
    } else {
        format!(
            "{} → {}",
            paint.on(sgr::BLUE, &report.state_before),
            paint.on(sgr::BOLD_BLUE, &report.state_after)
        )
    };
    eprintln!("  {} {}", paint.on(sgr::DIM, "state:"), transition);

    let scan = &report.scan;
    eprintln!(
        "  {} considered {}  │  gated {}  │  trait-skipped {}  │  evaluated {}  │  {}",
        paint.on(sgr::DIM, "rules:"),
        paint.on(sgr::YELLOW, scan.considered.to_string()),
        paint.on(sgr::YELLOW, scan.gated.to_string()),
        paint.on(sgr::YELLOW, scan.trait_skipped.to_string()),
        paint.on(sgr::YELLOW, scan.evaluated.to_string()),
        paint.on(sgr::DIM, format!("{:?}", report.elapsed)),
    );
    eprintln!();
}
