mod api_client;
mod auth;
mod circuit_breaker;
mod config;
mod dashboard;
mod decisoes;
mod empresa;
mod errors;
mod kpis;
mod macro_chart;
mod models;
mod panels;
mod rede;
mod render;
mod resolver;
mod route;
mod score;

use clap::{Parser, Subcommand};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::api_client::CoreApiClient;
use crate::auth::AuthService;
use crate::config::Config;
use crate::dashboard::DashboardView;
use crate::decisoes::{decisao_label, format_brl};
use crate::empresa::EmpresaView;
use crate::kpis::KpisView;
use crate::resolver::EmpresaResolver;
use crate::route::{parse_route, route_for_search, route_to_path, tab_selection, Route, Tab};

#[derive(Parser)]
#[command(name = "painel-credito", about = "Painel de analise de credito PJ")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Dashboard panels; with a search term, jumps straight to the company page
    Dashboard {
        term: Option<String>,
        /// Read search terms (or /paths) from stdin until EOF
        #[arg(long)]
        interactive: bool,
    },
    /// Company page by id or CNPJ
    Empresa {
        identifier: String,
        #[arg(long)]
        tab: Option<String>,
        #[arg(long)]
        focus: Option<String>,
    },
    /// KPI summary over the decision history
    Kpis,
    /// Request a new credit decision for a company
    Decidir { identifier: String },
    /// Store the session token
    Login {
        email: String,
        #[arg(long)]
        password: Option<String>,
    },
    /// Remove the session token
    Logout,
}

/// Shared wiring for the view commands.
struct App {
    client: CoreApiClient,
    resolver: Arc<EmpresaResolver>,
    config: Config,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "painel_credito=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;
    let auth = AuthService::new(&config);

    let command = Cli::parse().command.unwrap_or(Command::Dashboard {
        term: None,
        interactive: false,
    });

    match command {
        Command::Login { email, password } => {
            let password = match password {
                Some(p) => p,
                None => prompt_password()?,
            };
            if auth.login(&email, &password) {
                println!("Login efetuado.");
            } else {
                println!("Credenciais invalidas.");
            }
            return Ok(());
        }
        Command::Logout => {
            auth.logout();
            println!("Sessao encerrada.");
            return Ok(());
        }
        command => {
            // Route guard: every other view requires a stored token.
            if !auth.is_logged_in() {
                println!("Sessao nao autenticada. Use: painel-credito login <email>");
                return Ok(());
            }

            let client = CoreApiClient::new(&config, auth.token())?;
            let resolver = Arc::new(EmpresaResolver::new(client.clone()));
            let app = App {
                client,
                resolver,
                config,
            };
            run_view(&app, command).await?;
        }
    }

    Ok(())
}

async fn run_view(app: &App, command: Command) -> anyhow::Result<()> {
    match command {
        Command::Dashboard { term, interactive } => {
            if let Some(term) = term {
                match route_for_search(&term) {
                    Some(route) => show_route(app, route).await,
                    None => println!("Informe um termo de busca."),
                }
            } else if interactive {
                interactive_loop(app).await?;
            } else {
                let view = DashboardView::new(
                    app.client.clone(),
                    app.resolver.clone(),
                    app.config.clone(),
                );
                view.load().await;
                println!("{}", view.render());
            }
        }
        Command::Empresa {
            identifier,
            tab,
            focus,
        } => {
            let route = Route::Empresa {
                identifier,
                cnpj_route: false,
                tab: tab.as_deref().and_then(Tab::from_raw),
                focus: focus.as_deref().and_then(Tab::from_raw),
                term: None,
            };
            show_route(app, route).await;
        }
        Command::Kpis => {
            let view = KpisView::new(app.client.clone(), app.config.clone());
            view.load().await;
            println!("{}", view.render());
        }
        Command::Decidir { identifier } => {
            let resolved = app.resolver.resolve(&identifier).await;
            match app.client.create_decisao(&resolved).await {
                Ok(decisao) => {
                    println!(
                        "Decisao registrada para {}: {} (limite {})",
                        resolved,
                        decisao_label(&decisao),
                        format_brl(decisao.limite.unwrap_or(0.0)),
                    );
                }
                Err(e) => {
                    tracing::error!("Erro ao registrar decisao: {}", e);
                    println!("Nao foi possivel registrar a decisao.");
                }
            }
        }
        Command::Login { .. } | Command::Logout => unreachable!("handled before view dispatch"),
    }

    Ok(())
}

async fn show_route(app: &App, route: Route) {
    match route {
        Route::Empresa {
            identifier,
            tab,
            focus,
            term,
            ..
        } => {
            let selection = tab_selection(
                tab.map(|t| t.key()),
                focus.map(|t| t.key()),
            );
            let view = EmpresaView::new(
                app.client.clone(),
                app.resolver.clone(),
                app.config.clone(),
                identifier,
                selection,
                term,
            );
            view.load().await;
            println!("{}", view.render());
            println!("\nVoltar: {}", route_to_path(&view.back_route()));
        }
        Route::Kpis => {
            let view = KpisView::new(app.client.clone(), app.config.clone());
            view.load().await;
            println!("{}", view.render());
        }
        Route::Login => {
            println!("Use: painel-credito login <email>");
        }
        Route::Dashboard { term } => {
            if let Some(route) = term.as_deref().and_then(route_for_search) {
                Box::pin(show_route(app, route)).await;
                return;
            }
            let view = DashboardView::new(
                app.client.clone(),
                app.resolver.clone(),
                app.config.clone(),
            );
            view.load().await;
            println!("{}", view.render());
        }
    }
}

/// Interactive dashboard: each stdin line is a search term or a /path; a new
/// line supersedes the previous load, whose late completions are discarded.
async fn interactive_loop(app: &App) -> anyhow::Result<()> {
    let dashboard = Arc::new(DashboardView::new(
        app.client.clone(),
        app.resolver.clone(),
        app.config.clone(),
    ));

    {
        let dashboard = dashboard.clone();
        tokio::spawn(async move {
            dashboard.load().await;
            println!("{}", dashboard.render());
        });
    }

    println!("Buscar por ID ou CNPJ (linha vazia limpa, 'sair' encerra):");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let term = line.trim().to_string();

        if term == "sair" {
            break;
        }

        if term.is_empty() {
            // Term cleared externally: panels return to initial.
            dashboard.clear();
            println!("{}", dashboard.render());
            continue;
        }

        if term.starts_with('/') {
            let route = parse_route(&term);
            show_route(app, route).await;
            continue;
        }

        match route_for_search(&term) {
            Some(route) => show_route(app, route).await,
            None => println!("Informe um termo de busca."),
        }
    }

    dashboard.teardown();
    Ok(())
}

fn prompt_password() -> anyhow::Result<String> {
    use std::io::Write;

    print!("Senha: ");
    std::io::stdout().flush()?;
    let mut password = String::new();
    std::io::stdin().read_line(&mut password)?;
    Ok(password.trim().to_string())
}
