use clap::Parser;

use lsb_lens::{
    cli::{Cli, Commands},
    handler::{
        handle_compare, handle_composite, handle_fidelity, handle_histogram, handle_normalize,
        handle_planes, handle_reconstruct,
    },
};

/// 程序的主入口点
///
/// 负责解析命令行参数，并根据指定的子命令
/// 将执行分派到相应的处理函数
fn main() -> anyhow::Result<()> {
    // 解析命令行参数
    let cli = Cli::parse();

    // 根据子命令调用相应的处理函数
    match cli.command {
        Commands::Normalize(args) => handle_normalize(args),
        Commands::Planes(args) => handle_planes(args),
        Commands::Composite(args) => handle_composite(args),
        Commands::Reconstruct(args) => handle_reconstruct(args),
        Commands::Histogram(args) => handle_histogram(args),
        Commands::Compare(args) => handle_compare(args),
        Commands::Fidelity(args) => handle_fidelity(args),
    }
}
