//! `skelanim info`: scene overview

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use skelanim_import::{ImportOptions, ImportedModel, load_model};

use crate::utils::{
    TreeOptions, add_table_row, create_table, format_matrix_summary, hierarchy_tree, render_tree,
};

#[derive(Args, Debug)]
pub struct InfoArgs {
    /// Path to the scene description (JSON)
    pub file: PathBuf,

    /// Maximum hierarchy depth to display
    #[arg(short, long)]
    pub depth: Option<usize>,

    /// Also give animated nodes without mesh references a bone slot
    #[arg(long)]
    pub all_channels: bool,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,
}

pub fn execute(args: &InfoArgs) -> Result<()> {
    let options = ImportOptions {
        register_unskinned_channels: args.all_channels,
        ..ImportOptions::default()
    };
    let model = load_model(&args.file, &options)
        .with_context(|| format!("Failed to import scene from {}", args.file.display()))?;

    print!("{}", render_info(&model, &args.file.display().to_string(), args));
    Ok(())
}

fn render_info(model: &ImportedModel, title: &str, args: &InfoArgs) -> String {
    let mut output = String::new();

    output.push_str("=== Hierarchy ===\n");
    let tree = hierarchy_tree(title, &model.hierarchy, &model.bone_index);
    output.push_str(&render_tree(
        &tree,
        &TreeOptions {
            // The title line sits one level above the scene root
            max_depth: args.depth.map(|d| d + 1),
            no_color: args.no_color,
            show_metadata: true,
        },
    ));

    output.push_str("\n=== Bones ===\n");
    let mut bones = create_table(&["Id", "Name", "Offset translation", "Offset rotation"]);
    for (name, info) in model.bone_index.iter() {
        let (translation, rotation) = format_matrix_summary(&info.offset);
        add_table_row(
            &mut bones,
            &[info.id.to_string(), name.to_string(), translation, rotation],
        );
    }
    output.push_str(&bones.to_string());

    output.push_str("\n=== Animations ===\n");
    let mut clips = create_table(&["Name", "Ticks", "Ticks/s", "Seconds", "Channels"]);
    for animation in &model.animations {
        let rate = if animation.tick_rate_was_defaulted() {
            format!("{} (default)", animation.ticks_per_second())
        } else {
            animation.ticks_per_second().to_string()
        };
        add_table_row(
            &mut clips,
            &[
                animation.name().to_string(),
                animation.duration().to_string(),
                rate,
                format!("{:.3}", animation.duration_secs()),
                animation.track_count().to_string(),
            ],
        );
    }
    output.push_str(&clips.to_string());

    output
}
