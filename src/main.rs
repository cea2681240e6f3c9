use clap::Parser;
use flag_colors::{cli, config, error, pipeline, viewer};
use cli::{BuildArgs, Cli, Commands};
use config::Config;
use error::Result;
use pipeline::PipelineOptions;
use std::process::ExitCode;
use viewer::{PageOptions, ViewerServer};

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("\n❌ {}", e);
            ExitCode::FAILURE
        }
    }
}

fn build(args: &BuildArgs, config: &mut Config, verbose: bool) -> Result<pipeline::PipelineOutput> {
    args.apply(config);
    config.validate()?;

    let output = pipeline::run(&PipelineOptions::from_config(config), verbose)?;
    pipeline::print_summary(&output.snapshot);
    Ok(output)
}

async fn run(cli: Cli) -> Result<()> {
    let mut config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };

    match cli.command {
        Commands::Build(args) => {
            println!("🎌 flag-colors - 平均色クラスタリング\n");
            build(&args, &mut config, cli.verbose)?;
            println!("\n✅ 完了");
        }

        Commands::Run(args) => {
            println!("🚀 flag-colors - 一括処理\n");
            let output = build(&args, &mut config, cli.verbose)?;

            println!("\n- ダッシュボードを生成中...");
            let page = viewer::write_page(&output.snapshot_path, None, &config.palette, &PageOptions::default())?;
            println!("✔ HTML出力: {}", page.display());
            println!("\n✅ 完了");
        }

        Commands::View { snapshot, output, title } => {
            let snapshot_path = snapshot.unwrap_or_else(|| config.snapshot_path());
            let mut options = PageOptions::default();
            if let Some(title) = title {
                options.title = title;
            }

            println!("- ダッシュボードを生成中...");
            let page = viewer::write_page(&snapshot_path, output.as_deref(), &config.palette, &options)?;
            println!("✔ HTML出力: {}", page.display());
        }

        Commands::Serve { snapshot, port, host } => {
            let snapshot_path = snapshot.unwrap_or_else(|| config.snapshot_path());
            let port = port.unwrap_or(config.port);

            let server = ViewerServer::new(&snapshot_path, config.palette.clone(), PageOptions::default())?;
            let listener = server.bind(&format!("{}:{}", host, port)).await?;
            println!("🌐 flag-colors - ビューア");
            println!("✔ http://{} （Ctrl+C で終了）", listener.local_addr()?);

            server.serve(listener, cli.verbose).await?;
        }

        Commands::Config { show, init } => {
            if init {
                let path = match &cli.config {
                    Some(path) => {
                        config.save_to(path)?;
                        path.clone()
                    }
                    None => config.save()?,
                };
                println!("✔ 設定ファイルを作成しました: {}", path.display());
            }

            if show || !init {
                println!("設定:");
                println!("  入力フォルダ: {}", config.input_dir.display());
                println!("  出力フォルダ: {}", config.build_dir.display());
                println!("  必要枚数: {}", config.expected_count);
                println!("  クラスタ数: {}", config.k);
                println!("  シード: {}", config.seed);
                println!("  試行回数: {} (最大反復 {})", config.n_init, config.max_iter);
                println!("  サムネイル幅: {}px (JPEG品質 {})", config.thumb_width, config.jpeg_quality);
                println!("  配色: {}", config.palette.colors().join(", "));
                println!("  ポート: {}", config.port);
            }
        }
    }

    Ok(())
}
