use crate::{CleanArgs, build::base_path_from_config, config::Config};

pub async fn run(args: &CleanArgs) -> Result<(), anyhow::Error> {
    let config_path = super::config_path(args.config_file.as_deref())?;
    let config = Config::load_from_arg(Some(config_path.as_path())).await?;

    let base_path = base_path_from_config(&config_path);
    let output_dir = config.output_dir(&base_path);
    let output_dir = output_dir.canonicalize().unwrap_or(output_dir);

    if !output_dir.exists() {
        println!("Nothing to clean at {}", output_dir.display());
        return Ok(());
    }

    // Never remove the project itself
    if base_path.canonicalize().is_ok_and(|base| base.starts_with(&output_dir)) {
        return Err(anyhow::anyhow!(
            "Refusing to delete {}: it contains the project",
            output_dir.display()
        ));
    }

    if args.dry_run {
        println!("Would delete {}", output_dir.display());
    } else {
        tokio::fs::remove_dir_all(&output_dir).await?;
        println!("Deleted {}", output_dir.display());
    }

    Ok(())
}
