use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use xshell::{Shell, cmd};

#[derive(Parser)]
#[command(name = "xtask", about = "mxtract 开发任务自动化")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// 构建所有组件 (release)
    Build,
    /// 运行 TUI (开发模式)
    Tui {
        /// 日志级别 (trace, debug, info, warn, error)
        #[arg(short, long, default_value = "debug")]
        log_level: String,
        /// 日志输出文件 (默认 /tmp/mxtract.log)
        #[arg(short = 'o', long)]
        log_file: Option<String>,
    },
    /// 用命令行模拟一次提取
    Demo {
        /// 提取后下载到该目录
        #[arg(short, long)]
        output: Option<String>,
    },
    /// 运行测试
    Test,
    /// 运行 clippy 检查
    Lint,
    /// 清理构建产物
    Clean,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let sh = Shell::new()?;

    // 确保在项目根目录执行
    let project_root = std::env::var("CARGO_MANIFEST_DIR")
        .map(PathBuf::from)
        .ok()
        .and_then(|p| p.parent().map(|p| p.to_path_buf()));
    let project_root = match project_root {
        Some(root) => root,
        None => std::env::current_dir()?,
    };
    sh.change_dir(&project_root);

    match cli.command {
        Commands::Build => build(&sh)?,
        Commands::Tui {
            log_level,
            log_file,
        } => tui(&sh, &log_level, log_file)?,
        Commands::Demo { output } => demo(&sh, output)?,
        Commands::Test => test(&sh)?,
        Commands::Lint => lint(&sh)?,
        Commands::Clean => clean(&sh)?,
    }

    Ok(())
}

fn build(sh: &Shell) -> Result<()> {
    println!("🔨 构建所有组件...");
    cmd!(sh, "cargo build --release -p mxtract-cli -p mxtract-tui").run()?;
    println!("✅ 构建完成");
    Ok(())
}

fn tui(sh: &Shell, log_level: &str, log_file: Option<String>) -> Result<()> {
    let log_file = log_file.unwrap_or_else(|| "/tmp/mxtract.log".to_string());

    println!("🖥️  启动 TUI 调试模式...");
    println!("   日志级别: {log_level}");
    println!("   日志文件: {log_file}");
    println!();
    println!("💡 提示: 在另一个终端运行以下命令查看实时日志:");
    println!("   tail -f {log_file}");
    println!();

    let rust_log = format!("{log_level},mxtract_core={log_level},reqwest=info,hyper=info");

    // 使用 shell 执行以支持重定向
    let command = format!("RUST_LOG='{rust_log}' cargo run -p mxtract-tui 2>> '{log_file}'");
    cmd!(sh, "bash -c {command}").run()?;

    println!();
    println!("📁 日志已保存到: {log_file}");
    Ok(())
}

fn demo(sh: &Shell, output: Option<String>) -> Result<()> {
    println!("⟁ 模拟批量提取...");
    let links = [
        "https://www.instagram.com/p/demo",
        "https://www.tiktok.com/@matrix/video/1",
        "https://x.com/neo/status/42",
    ];
    match output {
        Some(dir) => cmd!(
            sh,
            "cargo run -q -p mxtract-cli -- extract --batch --download --output {dir} {links...}"
        )
        .run()?,
        None => cmd!(sh, "cargo run -q -p mxtract-cli -- extract --batch {links...}").run()?,
    }
    Ok(())
}

fn test(sh: &Shell) -> Result<()> {
    println!("🧪 运行测试...");
    cmd!(sh, "cargo test --workspace").run()?;
    println!("✅ 测试完成");
    Ok(())
}

fn lint(sh: &Shell) -> Result<()> {
    println!("🔍 运行 clippy...");
    cmd!(sh, "cargo clippy --workspace --all-targets -- -D warnings").run()?;
    println!("✅ 检查通过");
    Ok(())
}

fn clean(sh: &Shell) -> Result<()> {
    println!("🧹 清理构建产物...");
    cmd!(sh, "cargo clean").run()?;
    println!("✅ 清理完成");
    Ok(())
}
