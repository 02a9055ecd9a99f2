//! Subcommand handlers

use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

use anyhow::{anyhow, bail, Context};
use cachekeep_store::raster;
use cachekeep_store::{CacheStore, ImageFormat, SecretString, StoreConfig, WriteMode};
use secrecy::Secret;

use crate::Commands;

/// Pick the cache root: explicit flag, else `<platform cache dir>/cachekeep`.
pub fn resolve_root(explicit: Option<PathBuf>) -> anyhow::Result<PathBuf> {
    if let Some(root) = explicit {
        return Ok(root);
    }
    dirs::cache_dir()
        .map(|dir| dir.join("cachekeep"))
        .ok_or_else(|| anyhow!("No platform cache directory; pass --root"))
}

pub fn open_store(root: PathBuf, atomic: bool) -> CacheStore {
    let config = StoreConfig {
        write_mode: if atomic {
            WriteMode::Atomic
        } else {
            WriteMode::Direct
        },
        ..StoreConfig::default()
    };
    CacheStore::open_with(root, config)
}

/// The `--passphrase` flag wins over the environment. Empty values count as unset.
pub fn resolve_passphrase(flag: Option<String>, env: Option<String>) -> Option<SecretString> {
    flag.or(env).filter(|p| !p.is_empty()).map(Secret::new)
}

fn require_passphrase(passphrase: Option<&SecretString>) -> anyhow::Result<&SecretString> {
    passphrase.ok_or_else(|| {
        anyhow!("Encrypted entries need a passphrase: use --passphrase or ${}", crate::PASSPHRASE_ENV)
    })
}

fn read_input(file: Option<&Path>) -> anyhow::Result<String> {
    match file {
        Some(path) => fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display())),
        None => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read stdin")?;
            Ok(buf)
        }
    }
}

/// Format to use for `path`: the explicit choice, else its extension, else PNG.
pub fn format_for(path: &Path, explicit: Option<ImageFormat>) -> ImageFormat {
    explicit
        .or_else(|| {
            path.extension()
                .and_then(|ext| ext.to_str())
                .and_then(ImageFormat::from_extension)
        })
        .unwrap_or(ImageFormat::Png)
}

/// Run one subcommand. Returns `false` only when `exists` finds nothing.
pub fn run(
    store: &CacheStore,
    command: Commands,
    passphrase: Option<&SecretString>,
) -> anyhow::Result<bool> {
    match command {
        Commands::Put {
            name,
            file,
            encrypt,
        } => {
            let text = read_input(file.as_deref())?;
            if encrypt {
                store.write_encrypted(&name, &text, require_passphrase(passphrase)?)?;
            } else {
                store.write(&name, &text)?;
            }
            eprintln!("Stored {} ({} bytes)", name, text.len());
        }

        Commands::Get { name, decrypt } => {
            let text = if decrypt {
                store.read_encrypted(&name, require_passphrase(passphrase)?)?
            } else {
                store.read(&name)?
            };
            io::stdout().write_all(text.as_bytes())?;
        }

        Commands::PutJson {
            name,
            file,
            encrypt,
        } => {
            let input = read_input(file.as_deref())?;
            let value: serde_json::Value =
                serde_json::from_str(&input).context("Input is not valid JSON")?;
            if encrypt {
                store.write_record_encrypted(&name, &value, require_passphrase(passphrase)?)?;
            } else {
                store.write_record(&name, &value)?;
            }
            eprintln!("Stored record {}", name);
        }

        Commands::GetJson { name, decrypt } => {
            let value: serde_json::Value = if decrypt {
                store.read_record_encrypted(&name, require_passphrase(passphrase)?)?
            } else {
                store.read_record(&name)?
            };
            println!("{}", serde_json::to_string_pretty(&value)?);
        }

        Commands::PutImage {
            name,
            file,
            format,
            quality,
        } => {
            let bytes =
                fs::read(&file).with_context(|| format!("Failed to read {}", file.display()))?;
            let image = raster::decode(&bytes)
                .with_context(|| format!("{} is not a supported image", file.display()))?;
            let format = format_for(&file, format);
            match quality {
                Some(q) if q > raster::MAX_QUALITY => {
                    bail!("Quality must be between 0 and {}", raster::MAX_QUALITY)
                }
                Some(q) => store.write_image(&name, &image, format, q)?,
                None => store.write_image_default(&name, &image, format)?,
            }
            eprintln!(
                "Stored image {} ({}x{}, {})",
                name,
                image.width(),
                image.height(),
                format
            );
        }

        Commands::GetImage { name, out, format } => {
            let image = store.read_image(&name)?;
            let format = format_for(&out, format);
            let bytes = raster::encode(&image, format, store.config().default_image_quality)
                .with_context(|| format!("Failed to encode {} as {}", name, format))?;
            fs::write(&out, bytes)
                .with_context(|| format!("Failed to write {}", out.display()))?;
        }

        Commands::PutBin { name, file } => {
            let bytes =
                fs::read(&file).with_context(|| format!("Failed to read {}", file.display()))?;
            store.write_binary(&name, &bytes)?;
            eprintln!("Stored {} ({} bytes)", name, bytes.len());
        }

        Commands::GetBin { name, out } => {
            let bytes = store.read_binary(&name)?;
            match out {
                Some(path) => fs::write(&path, bytes)
                    .with_context(|| format!("Failed to write {}", path.display()))?,
                None => io::stdout().write_all(&bytes)?,
            }
        }

        Commands::Rm { name } => {
            store.delete(&name)?;
            eprintln!("Deleted {}", name);
        }

        Commands::Exists { name } => {
            let exists = store.contains(&name)?;
            println!("{}", if exists { "yes" } else { "no" });
            return Ok(exists);
        }
    }

    Ok(true)
}
