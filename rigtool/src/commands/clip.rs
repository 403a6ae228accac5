//! Animation clip command implementations

use anyhow::{Context, Result};
use clap::Subcommand;
use std::path::{Path, PathBuf};

use rig_anim::envelope::{CLIP_MAGIC, has_header};
use rig_anim::{AnimationClip, PlaybackSampler, decode_clip, encode_clip, encode_clip_with_header};

use super::{display_name, read_file, resource_id_for};
use crate::utils::{
    add_table_row, create_table, format_bytes, format_optional, format_quat, format_seconds,
    format_vec3,
};

#[derive(Subcommand)]
pub enum ClipCommands {
    /// Display information about a clip file
    Info {
        /// Path to the clip file
        file: PathBuf,

        /// Resource identifier (defaults to the numeric file name)
        #[arg(long)]
        uid: Option<u64>,

        /// Print the summary as JSON
        #[arg(long)]
        json: bool,
    },

    /// Validate a clip file
    Validate {
        /// Path to the clip file
        file: PathBuf,
    },

    /// Sample every channel of a clip at a point in time
    Sample {
        /// Path to the clip file
        file: PathBuf,

        /// Playback time in seconds
        #[arg(short, long)]
        time: f32,

        /// Only sample this node
        #[arg(short, long)]
        node: Option<String>,

        /// Wrap the time around the clip duration
        #[arg(long = "loop")]
        looping: bool,
    },

    /// Rewrite a clip with or without the versioned header
    Convert {
        /// Path to the input clip file
        input: PathBuf,

        /// Path to write the converted clip
        output: PathBuf,

        /// Write the bare layout without magic and version
        #[arg(long)]
        bare: bool,
    },

    /// Import animations from a glTF asset into clip files
    #[cfg(feature = "gltf")]
    Import {
        /// Path to the .gltf or .glb file
        input: PathBuf,

        /// Directory receiving one <uid>.clip per animation
        out_dir: PathBuf,

        /// Identifier of the first animation; later ones count up from it
        #[arg(long, default_value_t = rig_anim::ResourceCategory::Animation.prefix() * rig_anim::CATEGORY_DIVISOR)]
        base_uid: u64,
    },
}

pub fn execute(command: ClipCommands) -> Result<()> {
    match command {
        ClipCommands::Info { file, uid, json } => execute_info(&file, uid, json),
        ClipCommands::Validate { file } => execute_validate(&file),
        ClipCommands::Sample {
            file,
            time,
            node,
            looping,
        } => execute_sample(&file, time, node.as_deref(), looping),
        ClipCommands::Convert { input, output, bare } => execute_convert(&input, &output, bare),
        #[cfg(feature = "gltf")]
        ClipCommands::Import {
            input,
            out_dir,
            base_uid,
        } => execute_import(&input, &out_dir, base_uid),
    }
}

/// Read and decode a clip file
pub fn load_clip(path: &Path, uid: Option<u64>) -> Result<(AnimationClip, Vec<u8>)> {
    let data = read_file(path)?;
    let clip = decode_clip(resource_id_for(path, uid), &display_name(path), &data)
        .with_context(|| format!("Failed to parse clip: {}", path.display()))?;
    Ok((clip, data))
}

fn execute_info(path: &Path, uid: Option<u64>, json: bool) -> Result<()> {
    let (clip, data) = load_clip(path, uid)?;
    let headered = has_header(&data, CLIP_MAGIC);

    if json {
        return print_json(&clip, data.len(), headered);
    }

    println!("Clip Information");
    println!("================");
    println!();
    println!("File: {}", path.display());
    println!("Size: {}", format_bytes(data.len() as u64));
    println!("Name: {}", clip.name());
    println!("UID: {} ({})", clip.uid(), clip.uid().category());
    println!(
        "Format: {}",
        if headered { "versioned header" } else { "bare" }
    );
    println!("Duration: {}", format_seconds(clip.duration()));
    println!("Channels: {}", clip.channel_count());
    println!("Tracks: {}", clip.track_count());
    println!("Keyframes: {}", clip.keyframe_count());

    if clip.channel_count() > 0 {
        println!();
        let mut table = create_table(vec!["Node", "Position keys", "Rotation keys", "End"]);
        for (node, channel) in clip.channels() {
            add_table_row(
                &mut table,
                vec![
                    node.to_string(),
                    channel.position_track().len().to_string(),
                    channel.rotation_track().len().to_string(),
                    format_seconds(channel.end_time()),
                ],
            );
        }
        table.printstd();
    }

    Ok(())
}

#[cfg(feature = "json")]
fn print_json(clip: &AnimationClip, size: usize, headered: bool) -> Result<()> {
    let channels: Vec<_> = clip
        .channels()
        .map(|(node, channel)| {
            serde_json::json!({
                "node": node,
                "position_keys": channel.position_track().len(),
                "rotation_keys": channel.rotation_track().len(),
                "end_time": channel.end_time(),
            })
        })
        .collect();
    let summary = serde_json::json!({
        "name": clip.name(),
        "uid": clip.uid().0,
        "size": size,
        "headered": headered,
        "duration": clip.duration(),
        "keyframes": clip.keyframe_count(),
        "channels": channels,
    });
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}

#[cfg(not(feature = "json"))]
fn print_json(_clip: &AnimationClip, _size: usize, _headered: bool) -> Result<()> {
    anyhow::bail!("JSON output requires the `json` feature")
}

fn execute_validate(path: &Path) -> Result<()> {
    use console::style;

    // decoding runs every structural check, so a clip that loads is valid
    let data = read_file(path)?;
    let clip = match decode_clip(resource_id_for(path, None), &display_name(path), &data) {
        Ok(clip) => clip,
        Err(err) => {
            println!("{} {}", style("✗").red(), err);
            anyhow::bail!("Validation failed: {}", err);
        }
    };

    println!(
        "{} {} is valid ({} channels, {})",
        style("✓").green(),
        path.display(),
        clip.channel_count(),
        format_seconds(clip.duration())
    );
    Ok(())
}

fn execute_sample(path: &Path, time: f32, node: Option<&str>, looping: bool) -> Result<()> {
    let (clip, _) = load_clip(path, None)?;

    let mut sampler = PlaybackSampler::new();
    sampler.play(&clip, looping);
    sampler.update(time);

    let nodes: Vec<&str> = match node {
        Some(node) => {
            if clip.channel(node).is_none() {
                anyhow::bail!("Clip {} has no channel for node {}", clip.name(), node);
            }
            vec![node]
        }
        None => clip.channel_names().collect(),
    };

    println!(
        "{} at {} ({:?})",
        clip.name(),
        format_seconds(sampler.current_time()),
        sampler.state()
    );
    let mut table = create_table(vec!["Node", "Position", "Rotation"]);
    for name in nodes {
        let Some(pose) = sampler.sample_node(&clip, name) else {
            continue;
        };
        add_table_row(
            &mut table,
            vec![
                name.to_string(),
                format_optional(pose.position, format_vec3),
                format_optional(pose.rotation, format_quat),
            ],
        );
    }
    table.printstd();
    Ok(())
}

fn execute_convert(input: &Path, output: &Path, bare: bool) -> Result<()> {
    use console::style;

    let (clip, data) = load_clip(input, None)?;
    let encoded = if bare {
        encode_clip(&clip)?
    } else {
        encode_clip_with_header(&clip)?
    };
    std::fs::write(output, &encoded)
        .with_context(|| format!("Failed to write file: {}", output.display()))?;

    println!(
        "{} Converted {} ({}) -> {} ({}, {})",
        style("✓").green(),
        input.display(),
        format_bytes(data.len() as u64),
        output.display(),
        format_bytes(encoded.len() as u64),
        if bare { "bare" } else { "versioned header" }
    );
    Ok(())
}

#[cfg(feature = "gltf")]
fn execute_import(input: &Path, out_dir: &Path, base_uid: u64) -> Result<()> {
    use console::style;

    let imported = rig_anim::import::import_file(input, rig_anim::ResourceId(base_uid))
        .with_context(|| format!("Failed to import: {}", input.display()))?;
    std::fs::create_dir_all(out_dir)
        .with_context(|| format!("Failed to create directory: {}", out_dir.display()))?;

    let mut table = create_table(vec!["UID", "Name", "Channels", "Duration", "File"]);
    for clip in &imported.clips {
        let path = out_dir.join(format!("{}.{}", clip.uid(), rig_anim::cache::CLIP_EXTENSION));
        std::fs::write(&path, encode_clip_with_header(clip)?)
            .with_context(|| format!("Failed to write file: {}", path.display()))?;
        add_table_row(
            &mut table,
            vec![
                clip.uid().to_string(),
                clip.name().to_string(),
                clip.channel_count().to_string(),
                format_seconds(clip.duration()),
                path.display().to_string(),
            ],
        );
    }
    table.printstd();

    for (index, skin) in imported.skins.iter().enumerate() {
        println!("Skin {}: {} bones", index, skin.bone_count());
    }
    println!(
        "{} Imported {} clips and {} skins from {}",
        style("✓").green(),
        imported.clips.len(),
        imported.skins.len(),
        input.display()
    );
    Ok(())
}
