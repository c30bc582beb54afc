//! mxtract CLI
//!
//! 无界面的命令行入口：模拟提取、平台识别、查看配置。

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use futures_util::StreamExt;
use mxtract_core::workflow::{planned_items, run_stamp};
use mxtract_core::{
    AppSettings, HttpSaver, InputMode, MediaItem, MediaSaver, Platform, collect_links,
    extraction_stream, spawn_download_all,
};
use std::io::{self, Read};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "mxtract", version, about = "MEDIA_EXTRACTOR - EXTRACT // DOWNLOAD // LIBERATE")]
struct Cli {
    /// 输出调试日志
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// 提取链接中的媒体
    Extract {
        /// 媒体链接 (不指定则从标准输入读取，每行一个)
        links: Vec<String>,
        /// 批量模式：每个参数（或每行）一个链接
        #[arg(short, long)]
        batch: bool,
        /// 下载提取结果
        #[arg(short, long)]
        download: bool,
        /// 保存目录 (默认: 配置中的下载目录)
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// 以 JSON 行输出
        #[arg(long)]
        json: bool,
    },
    /// 识别链接所属平台
    Detect {
        url: String,
    },
    /// 查看当前配置
    Config {
        /// 只打印配置文件路径
        #[arg(long)]
        show_path: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Extract {
            links,
            batch,
            download,
            output,
            json,
        } => {
            let text = if links.is_empty() {
                let mut buf = String::new();
                io::stdin()
                    .read_to_string(&mut buf)
                    .context("failed to read links from stdin")?;
                buf
            } else {
                links.join("\n")
            };
            let links = if batch {
                collect_links(&text, InputMode::Batch)
            } else {
                single_link(&text)?
            };
            if links.is_empty() {
                // 与界面一致：空输入什么也不做
                return Ok(());
            }

            let items = extract(&links, json).await?;

            if download {
                let dir = output.unwrap_or_else(|| AppSettings::load().download_dir);
                info!("Downloading {} items to {}", items.len(), dir.display());
                download_all(items, Arc::new(HttpSaver::new(dir))).await?;
            }
        }
        Commands::Detect { url } => {
            println!("{}", Platform::detect(&url));
        }
        Commands::Config { show_path } => {
            if show_path {
                println!("{}", AppSettings::config_path().display());
            } else {
                print!("{}", AppSettings::load().to_toml()?);
            }
        }
    }

    Ok(())
}

fn init_logging(verbose: bool) {
    let _ = tracing_log::LogTracer::init();
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(if verbose { "debug" } else { "info" })
    });
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .compact()
        .try_init();
}

/// 运行模拟提取，逐个打印到达的结果
async fn extract(links: &[String], json: bool) -> Result<Vec<MediaItem>> {
    let total = planned_items(links.len());
    if !json {
        println!("⟁ INITIATE_EXTRACTION ({total}/{} links)", links.len());
        if let [single] = links {
            println!("  platform: {}", Platform::detect(single));
        }
    }

    let stamp = run_stamp();
    debug!("Extraction run {} ({} links, {} items)", stamp, links.len(), total);
    let mut stream = Box::pin(extraction_stream(links.len(), stamp));
    let mut items = Vec::with_capacity(total);
    while let Some(item) = stream.next().await {
        if json {
            println!("{}", serde_json::to_string(&item)?);
        } else {
            println!(
                "  [{}/{}] {:<9} {:<10} {}",
                items.len() + 1,
                total,
                item.kind.badge(),
                item.platform,
                item.thumbnail
            );
        }
        items.push(item);
    }
    if !json {
        println!("▶ EXTRACTED_MEDIA [{}]", items.len());
    }
    info!("Extraction finished: {} items", items.len());
    Ok(items)
}

/// 按固定间隔触发下载，并等待所有保存完成后退出
async fn download_all(items: Vec<MediaItem>, saver: Arc<dyn MediaSaver>) -> Result<()> {
    let downloads = spawn_download_all(saver, items)
        .await
        .context("download trigger task failed")?;
    for download in downloads {
        // 单个下载的失败已在日志中报告
        let _ = download.await;
    }
    Ok(())
}

/// 单链接模式：整段输入视为一个链接，多于一行时提示使用 --batch
fn single_link(text: &str) -> Result<Vec<String>> {
    let lines: Vec<&str> = text.lines().filter(|l| !l.trim().is_empty()).collect();
    match lines.as_slice() {
        [] => Ok(Vec::new()),
        [link] => Ok(collect_links(link, InputMode::Single)),
        _ => bail!("{} links given; use --batch to extract several at once", lines.len()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mxtract_core::{DownloadError, DownloadRequest};
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_single_link_rejects_multiple() {
        assert_eq!(
            single_link("https://x.com/a\n").unwrap(),
            vec!["https://x.com/a".to_string()]
        );
        assert!(single_link("  \n").unwrap().is_empty());
        assert!(single_link("https://x.com/a\nhttps://x.com/b").is_err());
    }

    #[test]
    fn test_cli_parses_extract_flags() {
        let cli = Cli::try_parse_from(["mxtract", "extract", "--batch", "--json", "a", "b"]).unwrap();
        let Commands::Extract { links, batch, json, download, .. } = cli.command else {
            panic!("expected extract");
        };
        assert_eq!(links, vec!["a", "b"]);
        assert!(batch && json && !download);
    }

    #[derive(Clone, Default)]
    struct Captured(Arc<std::sync::Mutex<Vec<u8>>>);

    impl io::Write for Captured {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_extract_reports_progress_through_tracing() {
        let captured = Captured::default();
        let writer = captured.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .with_max_level(tracing::Level::DEBUG)
            .finish();
        let _guard = tracing::subscriber::set_default(subscriber);

        let items = extract(&["https://x.com/a".to_string()], true).await.unwrap();
        assert_eq!(items.len(), 1);

        let output = String::from_utf8(captured.0.lock().unwrap().clone()).unwrap();
        assert!(output.contains("Extraction run"), "{output}");
        assert!(output.contains("Extraction finished: 1 items"), "{output}");
    }

    #[tokio::test]
    async fn test_download_all_waits_for_every_save() {
        let dir = tempfile::tempdir().unwrap();
        let items: Vec<MediaItem> = (0..2).map(|i| MediaItem::synthesize(3, i)).collect();
        let saver = Arc::new(UnreachableSaver {
            inner: HttpSaver::new(dir.path()),
            attempts: AtomicUsize::new(0),
        });

        download_all(items, saver.clone()).await.unwrap();
        assert_eq!(saver.attempts.load(Ordering::SeqCst), 2);
    }

    /// 把请求改写到不可达地址 (端口 9) 并计数，每次保存都会失败
    struct UnreachableSaver {
        inner: HttpSaver,
        attempts: AtomicUsize,
    }

    #[async_trait::async_trait]
    impl MediaSaver for UnreachableSaver {
        async fn save(&self, mut request: DownloadRequest) -> Result<PathBuf, DownloadError> {
            request.url = "http://127.0.0.1:9/missing.jpg".to_string();
            let result = self.inner.save(request).await;
            self.attempts.fetch_add(1, Ordering::SeqCst);
            result
        }
    }
}
