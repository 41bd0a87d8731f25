//! `skelanim sample`: play a clip and dump the final bone matrices

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result, anyhow};
use clap::{Args, ValueEnum};
use log::{debug, info};
use serde::Serialize;
use skelanim_core::{Animation, Animator, AnimatorConfig, MAX_BONES};
use skelanim_import::{ImportOptions, ImportedModel, load_model};

use crate::utils::{add_table_row, create_table, format_matrix_summary};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Table,
    Json,
}

#[derive(Args, Debug)]
pub struct SampleArgs {
    /// Path to the scene description (JSON)
    pub file: PathBuf,

    /// Clip to play (defaults to the first clip in the scene)
    #[arg(short, long)]
    pub clip: Option<String>,

    /// Seconds between frames
    #[arg(long, default_value_t = 1.0 / 30.0)]
    pub dt: f64,

    /// Number of frames to print; the first frame is the clip start
    #[arg(short, long, default_value_t = 5)]
    pub frames: usize,

    /// Number of bone matrix slots
    #[arg(long, default_value_t = MAX_BONES)]
    pub max_bones: usize,

    /// Also give animated nodes without mesh references a bone slot
    #[arg(long)]
    pub all_channels: bool,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    pub format: OutputFormat,
}

#[derive(Debug, Serialize)]
struct FrameSample {
    frame: usize,
    /// Playback time in ticks
    time: f64,
    bones: Vec<BoneSample>,
}

#[derive(Debug, Serialize)]
struct BoneSample {
    id: u32,
    name: String,
    /// Column-major 4x4
    matrix: [f32; 16],
}

pub fn execute(args: &SampleArgs) -> Result<()> {
    if !args.dt.is_finite() {
        return Err(anyhow!("--dt must be a finite number of seconds"));
    }

    let options = ImportOptions {
        max_bones: args.max_bones,
        register_unskinned_channels: args.all_channels,
        ..ImportOptions::default()
    };
    let model = load_model(&args.file, &options)
        .with_context(|| format!("Failed to import scene from {}", args.file.display()))?;
    let animation = select_clip(&model, args.clip.as_deref())?;
    info!(
        "Sampling '{}' for {} frames every {}s",
        animation.name(),
        args.frames,
        args.dt
    );

    let frames = sample_frames(&model, animation, args)?;
    match args.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&frames)?),
        OutputFormat::Table => print!("{}", render_table(&frames)),
    }
    Ok(())
}

fn select_clip(model: &ImportedModel, name: Option<&str>) -> Result<Arc<Animation>> {
    let animation = match name {
        Some(name) => model.animation(name).ok_or_else(|| {
            let available: Vec<&str> = model.animation_names().collect();
            anyhow!(
                "Animation '{}' not found, available: {}",
                name,
                available.join(", ")
            )
        })?,
        None => model
            .animations
            .first()
            .ok_or_else(|| anyhow!("Scene contains no animations"))?,
    };
    Ok(Arc::clone(animation))
}

fn sample_frames(
    model: &ImportedModel,
    animation: Arc<Animation>,
    args: &SampleArgs,
) -> Result<Vec<FrameSample>> {
    let config = AnimatorConfig {
        max_bones: args.max_bones,
    };
    let mut animator = Animator::with_animation(Arc::clone(&model.bone_index), animation, &config)?;

    let mut frames = Vec::with_capacity(args.frames);
    for frame in 0..args.frames {
        animator.update(if frame == 0 { 0.0 } else { args.dt })?;
        debug!("Frame {} at tick {:.3}", frame, animator.current_time());

        let matrices = animator.final_bone_matrices();
        let bones = model
            .bone_index
            .iter()
            .filter_map(|(name, info)| {
                matrices.get(info.id).map(|m| BoneSample {
                    id: info.id,
                    name: name.to_string(),
                    matrix: m.to_cols_array(),
                })
            })
            .collect();
        frames.push(FrameSample {
            frame,
            time: animator.current_time(),
            bones,
        });
    }
    Ok(frames)
}

fn render_table(frames: &[FrameSample]) -> String {
    let mut table = create_table(&["Frame", "Tick", "Bone", "Id", "Translation", "Rotation"]);
    for frame in frames {
        for bone in &frame.bones {
            let (translation, rotation) =
                format_matrix_summary(&glam::Mat4::from_cols_array(&bone.matrix));
            add_table_row(
                &mut table,
                &[
                    frame.frame.to_string(),
                    format!("{:.3}", frame.time),
                    bone.name.clone(),
                    bone.id.to_string(),
                    translation,
                    rotation,
                ],
            );
        }
    }
    table.to_string()
}
