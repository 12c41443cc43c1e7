// Copyright (c) 2026 shaneyale (shaneyale86@gmail.com)
// All rights reserved.

//! # 播客订阅源服务器
//!
//! 将本地音频目录以 HTTP 提供下载，并在配置的路径上按需生成 RSS 2.0 订阅源。
//!
//! 启动流程：
//! 1. 初始化 log4rs 日志（`config/log4rs.yaml`）。
//! 2. 载入并校验配置文件，路径取第一个命令行参数，默认 `config/config.toml`。
//! 3. 按 `worker_threads` 构建 Tokio 运行时并绑定监听地址。
//! 4. 启动后台管理控制台（stop / status / help），等待 Ctrl-C 或 stop 指令停机。

use castr::{
    config::Config,
    server::{serve, ServerState},
};

use log::{error, info};
use tokio::{
    io::{AsyncBufReadExt, BufReader},
    net::TcpListener,
    runtime::Builder,
};

use std::{process::ExitCode, sync::Arc};

const DEFAULT_CONFIG: &str = "config/config.toml";
const LOG_CONFIG: &str = "config/log4rs.yaml";

fn main() -> ExitCode {
    if let Err(e) = log4rs::init_file(LOG_CONFIG, Default::default()) {
        eprintln!("无法初始化日志系统（{}）：{}，将在没有日志的情况下继续运行", LOG_CONFIG, e);
    }

    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_CONFIG.to_string());
    let config = match Config::load(&config_path).and_then(|c| c.validate().map(|_| c)) {
        Ok(config) => config,
        Err(e) => {
            error!("配置文件{}无效：{}", config_path, e);
            eprintln!("配置文件{}无效：{}", config_path, e);
            return ExitCode::FAILURE;
        }
    };
    info!("配置文件{}已载入", config_path);
    info!("file root: {}", config.file_root());
    info!("feed path: {}", config.feed_path());

    let runtime = match Builder::new_multi_thread()
        .worker_threads(config.worker_threads())
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("无法构建Tokio运行时：{}", e);
            return ExitCode::FAILURE;
        }
    };

    let code = runtime.block_on(run(config_path, config));
    // 控制台任务可能仍阻塞在标准输入上
    runtime.shutdown_background();
    code
}

async fn run(config_path: String, config: Config) -> ExitCode {
    let address = config.listen_addr();
    let listener = match TcpListener::bind(&address).await {
        Ok(listener) => listener,
        Err(e) => {
            error!("无法绑定地址：{}，错误：{}", address, e);
            return ExitCode::FAILURE;
        }
    };
    info!("服务端将在{}上监听Socket连接", address);

    let state = Arc::new(ServerState::new(config_path, config));

    tokio::spawn(console(Arc::clone(&state)));
    tokio::spawn({
        let state = Arc::clone(&state);
        async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                info!("收到Ctrl-C，准备停机");
                state.shutdown();
            }
        }
    });

    serve(listener, state).await;
    info!("服务器已停止");
    ExitCode::SUCCESS
}

/// 后台管理控制台，从标准输入读取运维指令
async fn console(state: Arc<ServerState>) {
    let mut reader = BufReader::new(tokio::io::stdin());
    let mut input = String::new();
    loop {
        input.clear();
        match reader.read_line(&mut input).await {
            Ok(0) | Err(_) => break,
            Ok(_) => {}
        }
        match input.trim() {
            "stop" => {
                println!("停机指令已激活，服务器将停止接受新连接...");
                state.shutdown();
                break;
            }
            "help" => {
                println!("== castr Help ==");
                println!("stop   - 发出停机信号");
                println!("status - 查看当前服务器运行状态");
                println!("help   - 显示此帮助信息");
                println!("================");
            }
            "status" => {
                println!("== castr 状态 ===");
                println!("当前活跃连接数: {}", state.active_connections());
                println!("订阅源路径: {}", state.config().feed_path());
                println!("文件根目录: {}", state.config().file_root());
                println!("================");
            }
            "" => {}
            cmd => println!("无效的命令：{}", cmd),
        }
    }
}
