//! List command implementation.

use console::style;
use miette::{Result, miette};
use overlay_core::TransformRule;
use overlay_engine::{Overlay, OverlayConfig};

use crate::output;

/// Lists local plugins and their rules without touching the shadow tree.
pub fn execute(config: OverlayConfig, detailed: bool) -> Result<()> {
    let overlay =
        Overlay::load(config).map_err(|e| miette!("Failed to load overlay: {}", e))?;

    if overlay.plugins().is_empty() {
        output::info("No local plugins declared in package.json");
        return Ok(());
    }

    let roots = overlay.watch_roots();

    println!("{}", style("Local plugins:").bold());
    println!();

    for plugin in overlay.plugins() {
        let rules: Vec<_> = overlay
            .rules()
            .filter(|rule| rule.plugin() == plugin.name)
            .collect();

        print!("  {}", style(&plugin.name).cyan().bold());
        if !roots.contains(&plugin.root_path.as_path()) {
            print!(" {}", style("(nested)").yellow());
        }
        println!(" - {} rule(s)", rules.len());
        println!("    {}", style(plugin.root_path.display()).dim());

        if detailed {
            for rule in rules {
                println!("    {}", describe(&overlay, rule));
            }
            println!();
        }
    }

    if detailed {
        output::section_header("Shadow tree");
        output::key_value("Location", &overlay.shadow_root().display().to_string());
    }

    Ok(())
}

/// One-line description of where a rule's source ends up.
fn describe(overlay: &Overlay, rule: &TransformRule) -> String {
    let destination = overlay
        .engine()
        .destination_for(rule, rule.source_path())
        .map(|d| {
            d.strip_prefix(overlay.shadow_root())
                .unwrap_or(&d)
                .display()
                .to_string()
        })
        .unwrap_or_else(|e| format!("<{}>", e));

    let detail = match rule {
        TransformRule::ModuleWrap {
            plugin,
            export_name,
            ..
        } => format!("{}.{}", plugin, export_name),
        TransformRule::AssetCopy { .. } => "copy".to_string(),
    };

    format!(
        "{} {} {} {} {}",
        style(rule.kind()).green(),
        rule.declared_source(),
        style("→").dim(),
        destination,
        style(format!("({})", detail)).dim()
    )
}
