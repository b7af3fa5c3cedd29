use std::sync::Arc;

use anyhow::Result;
use clap::{value_parser, ArgAction, Parser};
use emco_client::{EmcoClient, EmcoClientArgs};
use emco_console::{notify::Notifications, Console};
use emco_core::signal::ViewSignal;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub(crate) struct Args {
    #[command(flatten)]
    common: ArgsCommon,

    #[command(subcommand)]
    command: crate::commands::Command,
}

impl Args {
    pub(crate) async fn run(self) -> Result<()> {
        let (console, mut notifications) = self.common.run()?;
        let result = self.command.run(&console).await;

        for notification in notifications.drain() {
            eprintln!("{notification}");
        }
        result
    }
}

#[derive(Parser)]
pub(crate) struct ArgsCommon {
    /// Turn debugging information on
    #[arg(short, long, global = true, env = "EMCO_CONSOLE_DEBUG", action = ArgAction::Count)]
    #[arg(value_parser = value_parser!(u8).range(..=3))]
    debug: u8,

    #[command(flatten)]
    client: EmcoClientArgs,
}

impl ArgsCommon {
    fn run(self) -> Result<(Console, Notifications)> {
        self.init_logger();

        let signal = ViewSignal::default();
        signal.trap_on_sigint()?;

        let client = EmcoClient::try_new(self.client)?;
        Ok(Console::with_signal(Arc::new(client), signal))
    }

    fn init_logger(&self) {
        ::emco_core::tracer::init_once_with_level_int(self.debug, cfg!(feature = "otlp"))
    }
}
