use dotenv::dotenv;
use std::sync::Arc;
use supabase_records::prelude::*;
use supabase_records_auth::Auth;
use tokio::io::{self, AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const SIGNED_OUT_HELP: &str = "commands: email <address>, password <secret>, toggle, submit, quit";
const SIGNED_IN_HELP: &str =
    "commands: first <name>, last <name>, age <years>, save, reload, signout, quit";

type Screen = RecordScreen<Auth, SupabaseRecords>;

fn render(screen: &Screen) {
    match screen.view() {
        View::Credentials { mode } => {
            let action = match mode {
                AuthMode::SignIn => "Sign in",
                AuthMode::SignUp => "Sign up",
            };
            let form = &screen.form().credentials;
            println!("\n== {} ==", action);
            println!("email:    {}", form.email);
            println!("password: {}", "*".repeat(form.password.len()));
            println!("{}", SIGNED_OUT_HELP);
        }
        View::Records(records) => {
            let draft = &screen.form().draft;
            println!("\n== New record ==");
            println!(
                "first: {}  last: {}  age: {}",
                draft.first_name, draft.last_name, draft.age
            );
            println!("== Records ({}) ==", records.len());
            for record in records {
                let age = record
                    .age
                    .map(|age| age.to_string())
                    .unwrap_or_else(|| "-".to_string());
                println!(
                    "{:>6}  {} {}, {}  ({})",
                    record.id,
                    record.first_name,
                    record.last_name,
                    age,
                    record.created_at.format("%Y-%m-%d %H:%M")
                );
            }
            println!("{}", SIGNED_IN_HELP);
        }
    }
}

fn show_notices(screen: &mut Screen) {
    while let Some(notice) = screen.take_notice() {
        let label = match notice.kind {
            NoticeKind::Auth => "auth error",
            NoticeKind::Persistence => "error",
            NoticeKind::Validation => "invalid",
            NoticeKind::Info => "note",
        };
        println!("[{}] {}", label, notice.message);
    }
}

/// Apply one input line. Returns `false` when the user asked to quit.
async fn handle(screen: &mut Screen, line: &str) -> bool {
    let (command, argument) = match line.split_once(' ') {
        Some((command, argument)) => (command, argument.trim().to_string()),
        None => (line, String::new()),
    };
    let signed_in = screen.is_signed_in();

    match (signed_in, command) {
        (_, "quit") | (_, "exit") => return false,
        (false, "email") => screen.form_mut().credentials.email = argument,
        (false, "password") => screen.form_mut().credentials.password = argument,
        (false, "toggle") => screen.toggle_mode(),
        (false, "submit") => screen.submit_credentials().await,
        (true, "first") => screen.form_mut().draft.first_name = argument,
        (true, "last") => screen.form_mut().draft.last_name = argument,
        (true, "age") => screen.form_mut().draft.age = argument,
        (true, "save") => {
            if screen.submit_record().await == Some(SubmitOutcome::Skipped) {
                println!("first name, last name and age are all required");
            }
        }
        (true, "reload") => screen.reload().await,
        (true, "signout") => screen.sign_out().await,
        (_, "") => {}
        _ => println!("unknown command: {}", command),
    }
    true
}

#[tokio::main]
async fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .compact()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    let supabase = Supabase::from_env()?;
    info!(
        url = %supabase.config().url,
        table = %supabase.config().records_table,
        "Starting record screen"
    );

    let mut screen = RecordScreen::mount(supabase.auth(), Arc::new(supabase.records())).await;
    let mut lines = BufReader::new(io::stdin()).lines();
    let mut stdout = io::stdout();

    loop {
        screen.process_auth_changes().await;
        show_notices(&mut screen);
        render(&screen);
        stdout.write_all(b"> ").await?;
        stdout.flush().await?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        if !handle(&mut screen, line.trim()).await {
            break;
        }
    }

    screen.unmount();
    Ok(())
}
