//! ASCII banner with a green gradient (TUTORBOOK).

use crossterm::ExecutableCommand;
use crossterm::style::{Color, Print, ResetColor, SetForegroundColor};
use figlet_rs::FIGfont;
use std::io::{Write, stdout};

/// Chalkboard green shades for the gradient.
const LEAF_GREEN: (u8, u8, u8) = (0x43, 0xa5, 0x47);
const FOREST_GREEN: (u8, u8, u8) = (0x2e, 0x7d, 0x2e);

/// Linear interpolation between two RGB colors. `t` in [0.0, 1.0].
fn lerp_rgb(a: (u8, u8, u8), b: (u8, u8, u8), t: f64) -> (u8, u8, u8) {
    let r = (f64::from(a.0) * (1.0 - t) + f64::from(b.0) * t).round() as u8;
    let g = (f64::from(a.1) * (1.0 - t) + f64::from(b.1) * t).round() as u8;
    let bl = (f64::from(a.2) * (1.0 - t) + f64::from(b.2) * t).round() as u8;
    (r, g, bl)
}

/// Prints "TUTORBOOK" in figlet standard font with a top-to-bottom green
/// gradient, then the version line.
pub fn print_welcome() {
    let mut out = stdout();
    let Ok(font) = FIGfont::standard() else {
        let _ = out.execute(Print("TUTORBOOK\r\n"));
        return;
    };
    let Some(figure) = font.convert("TUTORBOOK") else {
        let _ = out.execute(Print("TUTORBOOK\r\n"));
        return;
    };
    let art = figure.to_string();
    let lines: Vec<&str> = art.lines().collect();
    let total = lines.len().max(1);

    for (i, line) in lines.iter().enumerate() {
        let t = if total <= 1 {
            1.0
        } else {
            i as f64 / (total - 1) as f64
        };
        let (r, g, b) = lerp_rgb(LEAF_GREEN, FOREST_GREEN, t);
        let _ = out.execute(SetForegroundColor(Color::Rgb { r, g, b }));
        let _ = out.execute(Print(line));
        let _ = out.execute(Print("\r\n"));
        let _ = out.execute(ResetColor);
    }

    let version = env!("CARGO_PKG_VERSION");
    let _ = out.execute(SetForegroundColor(Color::Rgb {
        r: FOREST_GREEN.0,
        g: FOREST_GREEN.1,
        b: FOREST_GREEN.2,
    }));
    let _ = out.execute(Print(format!("v{} - book your tutoring sessions\r\n", version)));
    let _ = out.execute(ResetColor);
    let _ = out.flush();
}
