use anyhow::Result;
use code_grader::utils::logging;
use code_grader::{App, Config};

#[tokio::main]
async fn main() -> Result<()> {
    // 加载配置
    let config = Config::from_env();

    // 初始化日志
    logging::init(&config.log_level);

    config.validate()?;
    config.require_api_key()?;

    // 初始化并运行应用
    App::initialize(config).await?.run().await?;

    Ok(())
}
