use std::process::ExitCode;

use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use client_core::{
    BoardController, DeleteAffordance, HttpActivityApi, LoadState, SignupOutcome,
    UnregisterOutcome,
};
use tracing_subscriber::EnvFilter;

mod dialogs;
mod render;

use dialogs::TerminalDialogs;
use render::render_board;

#[derive(Parser, Debug)]
#[command(about = "Activity sign-up board")]
struct Args {
    #[arg(long, env = "BOARD_SERVER_URL", default_value = "http://127.0.0.1:8000")]
    server_url: String,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Load and print the board.
    Show,
    /// Submit the sign-up form.
    Signup {
        #[arg(long)]
        email: String,
        #[arg(long)]
        activity: String,
    },
    /// Remove a participant through its delete control.
    Unregister {
        #[arg(long)]
        email: String,
        #[arg(long)]
        activity: String,
        /// Skip the confirmation prompt.
        #[arg(long)]
        yes: bool,
    },
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()))
        .with_writer(std::io::stderr)
        .init();
    let args = Args::parse();

    let assume_yes = matches!(args.command, Command::Unregister { yes: true, .. });
    let api = HttpActivityApi::new(&args.server_url)?;
    let mut board = BoardController::new(api, TerminalDialogs { assume_yes });

    board.fetch_activities().await;

    let succeeded = match args.command {
        Command::Show => board.load_state() == LoadState::Rendered,
        Command::Signup { email, activity } => {
            board.set_email(email);
            if board.select_activity(&activity) {
                match board.submit_signup().await {
                    SignupOutcome::SignedUp => true,
                    SignupOutcome::Incomplete => bail!("email and activity are both required"),
                    SignupOutcome::Rejected | SignupOutcome::NetworkFailure => false,
                }
            } else if board.load_state() == LoadState::Rendered {
                bail!("'{activity}' is not an activity on this board");
            } else {
                false
            }
        }
        Command::Unregister {
            email, activity, ..
        } => {
            let affordance = DeleteAffordance { activity, email };
            match board.delete_participant(&affordance).await {
                UnregisterOutcome::Unregistered | UnregisterOutcome::Declined => true,
                UnregisterOutcome::Stale if board.load_state() == LoadState::Rendered => bail!(
                    "{} is not listed under '{}'",
                    affordance.email,
                    affordance.activity
                ),
                UnregisterOutcome::Stale => false,
                UnregisterOutcome::Rejected | UnregisterOutcome::NetworkFailure => false,
            }
        }
    };

    print!("{}", render_board(board.view()));
    Ok(if succeeded {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
