use crate::{
    BuildArgs,
    build::{Builder, base_path_from_config},
    config::Config,
};

pub async fn run(args: &BuildArgs) -> Result<(), anyhow::Error> {
    let config_path = super::config_path(args.config_file.as_deref())?;
    let config = Config::load_from_arg(Some(config_path.as_path())).await?;

    // Relative paths in the config resolve against its directory
    let base_path = base_path_from_config(&config_path);

    let builder = Builder::new(config, base_path).with_dev_mode(args.dev);
    let result = tokio::task::spawn_blocking(move || builder.build()).await??;

    println!(
        "Built site to {} ({} documents, {} lessons, {} assets)",
        result.output_dir.display(),
        result.documents,
        result.lessons,
        result.assets
    );
    if result.skipped > 0 {
        println!(
            "Skipped {} document(s) with malformed front matter",
            result.skipped
        );
    }

    Ok(())
}
