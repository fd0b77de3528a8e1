//! Basemaps command - list the built-in imagery sources.

use console::style;
use tilefolio::provider::Basemap;

use crate::error::CliError;

/// Run the basemaps command.
pub fn run() -> Result<(), CliError> {
    println!(
        "{}",
        style(format!(
            "{:<15} {:<32} {:>8} {:>11}",
            "KEY", "NAME", "MAX ZOOM", "NATIVE ZOOM"
        ))
        .bold()
    );

    for basemap in Basemap::ALL {
        let source = basemap.source();
        let marker = if basemap == Basemap::default() { "*" } else { "" };
        println!(
            "{:<15} {:<32} {:>8} {:>11}",
            format!("{}{}", basemap.key(), marker),
            basemap.name(),
            source.max_zoom,
            source.max_native_zoom
        );
    }

    println!();
    println!("* default");
    println!("Any other XYZ source: export --template 'https://host/{{z}}/{{x}}/{{y}}.png'");
    Ok(())
}
