//! Walk-in CLI - front-desk console for the walk-in counter daemon

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tabled::{Table, Tabled};

const DEFAULT_RPC_URL: &str = "http://127.0.0.1:9630";

#[derive(Parser)]
#[command(name = "walkin")]
#[command(about = "Walk-in service counter console", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// RPC server URL
    #[arg(long, env = "WALKIN_RPC_URL", default_value = DEFAULT_RPC_URL)]
    rpc_url: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Add a client to the waiting line
    Enqueue {
        /// Client ID
        #[arg(long)]
        client_id: String,

        /// Client display name
        #[arg(long)]
        client: String,

        /// Service ID
        #[arg(long)]
        service_id: String,

        /// Service display name
        #[arg(long)]
        service: String,

        #[arg(long)]
        note: Option<String>,
    },

    /// Show the waiting line in service order
    Waiting,

    /// Pair the oldest waiting ticket with the least-loaded idle server
    Distribute,

    /// Assign a specific ticket to a specific idle server
    Assign { ticket_id: String, server_id: String },

    /// Finish an in-service ticket
    Complete {
        ticket_id: String,

        /// Amount charged, in cents
        #[arg(long)]
        charge: Option<i64>,

        #[arg(long)]
        note: Option<String>,
    },

    /// Cancel a waiting or in-service ticket
    Cancel {
        ticket_id: String,

        #[arg(long)]
        reason: Option<String>,
    },

    /// Show the server board
    Servers,

    /// Register a new server
    Register { name: String },

    /// Allow a server to check in again
    Activate { server_id: String },

    /// Prevent an absent server from checking in
    Deactivate { server_id: String },

    /// Check a server in at the back of the arrival order
    CheckIn { server_id: String },

    /// Check an idle server out
    CheckOut { server_id: String },

    /// Start-of-day roster reset
    Reset,

    /// Show counter status
    Status,

    /// Check the serving/in-service consistency
    Audit,
}

#[derive(Serialize)]
struct JsonRpcRequest {
    jsonrpc: String,
    method: String,
    params: serde_json::Value,
    id: u64,
}

#[derive(Deserialize)]
struct JsonRpcResponse {
    #[allow(dead_code)]
    jsonrpc: String,
    #[allow(dead_code)]
    id: u64,
    result: Option<serde_json::Value>,
    error: Option<JsonRpcError>,
}

#[derive(Deserialize)]
struct JsonRpcError {
    code: i32,
    message: String,
}

#[derive(Deserialize)]
struct TicketView {
    id: String,
    requester_name: String,
    service_name: String,
    server_id: Option<String>,
    status: String,
    created_at: i64,
    charge: Option<i64>,
}

#[derive(Tabled)]
struct WaitingRow {
    #[tabled(rename = "#")]
    position: usize,
    ticket: String,
    client: String,
    service: String,
    since: String,
}

#[derive(Deserialize)]
struct WaitingList {
    tickets: Vec<TicketView>,
}

#[derive(Deserialize, Tabled)]
struct AssignmentView {
    ticket_id: String,
    requester_name: String,
    server_name: String,
    service_name: String,
}

#[derive(Deserialize)]
struct ServerView {
    id: String,
    name: String,
    status: String,
    arrival_rank: i64,
    daily_served_count: i64,
    active: bool,
}

#[derive(Tabled)]
struct ServerRow {
    status: String,
    rank: String,
    name: String,
    served: i64,
    id: String,
}

#[derive(Deserialize)]
struct ServerList {
    serving: Vec<ServerView>,
    idle: Vec<ServerView>,
    absent: Vec<ServerView>,
    next_available: Option<ServerView>,
}

#[derive(Deserialize)]
struct AuditView {
    consistent: bool,
    tickets_in_service: usize,
    servers_serving: usize,
    servers_present: usize,
    violations: Vec<String>,
}

async fn call_rpc(url: &str, method: &str, params: serde_json::Value) -> Result<serde_json::Value> {
    let request = JsonRpcRequest {
        jsonrpc: "2.0".to_string(),
        method: method.to_string(),
        params,
        id: 1,
    };

    let client = reqwest::Client::new();
    let response: JsonRpcResponse = client
        .post(url)
        .json(&request)
        .send()
        .await
        .context("Failed to connect to daemon")?
        .json()
        .await
        .context("Failed to parse response")?;

    if let Some(error) = response.error {
        anyhow::bail!("RPC error ({}): {}", error.code, error.message);
    }

    response
        .result
        .ok_or_else(|| anyhow::anyhow!("No result in response"))
}

async fn call<T: DeserializeOwned>(url: &str, method: &str, params: serde_json::Value) -> Result<T> {
    let result = call_rpc(url, method, params).await?;
    serde_json::from_value(result).with_context(|| format!("Unexpected {} result", method))
}

fn clock(millis: i64) -> String {
    chrono::DateTime::from_timestamp_millis(millis)
        .map(|t| t.with_timezone(&chrono::Local).format("%H:%M").to_string())
        .unwrap_or_else(|| "-".to_string())
}

fn money(cents: Option<i64>) -> String {
    match cents {
        Some(c) => format!("{}.{:02}", c / 100, c % 100),
        None => "-".to_string(),
    }
}

fn server_rows(list: &ServerList) -> Vec<ServerRow> {
    list.serving
        .iter()
        .chain(&list.idle)
        .chain(&list.absent)
        .map(|s| ServerRow {
            status: match s.status.as_str() {
                "SERVING" => s.status.yellow().to_string(),
                "IDLE" => s.status.green().to_string(),
                _ if !s.active => "INACTIVE".dimmed().to_string(),
                _ => s.status.dimmed().to_string(),
            },
            rank: if s.arrival_rank > 0 {
                s.arrival_rank.to_string()
            } else {
                "-".to_string()
            },
            name: s.name.clone(),
            served: s.daily_served_count,
            id: s.id.clone(),
        })
        .collect()
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let url = cli.rpc_url.as_str();

    match cli.command {
        Commands::Enqueue {
            client_id,
            client,
            service_id,
            service,
            note,
        } => {
            let params = json!({
                "requester_id": client_id,
                "requester_name": client,
                "service_id": service_id,
                "service_name": service,
                "note": note,
            });

            let result = call_rpc(url, "ticket.enqueue.v1", params).await?;

            println!("{}", "✓ Client added to the waiting line".green().bold());
            println!("  {} {}", "Ticket:".bold(), result["ticket_id"].as_str().unwrap_or("-"));
        }

        Commands::Waiting => {
            let list: WaitingList = call(url, "ticket.list_waiting.v1", json!({})).await?;

            if list.tickets.is_empty() {
                println!("{}", "Nobody is waiting".yellow());
            } else {
                let rows: Vec<WaitingRow> = list
                    .tickets
                    .into_iter()
                    .enumerate()
                    .map(|(i, t)| WaitingRow {
                        position: i + 1,
                        ticket: t.id,
                        client: t.requester_name,
                        service: t.service_name,
                        since: clock(t.created_at),
                    })
                    .collect();
                println!("{}", Table::new(rows));
            }
        }

        Commands::Distribute => {
            let outcome = call_rpc(url, "distribute.auto.v1", json!({})).await?;

            if outcome["outcome"] == "ASSIGNED" {
                let assignment: AssignmentView = serde_json::from_value(outcome)?;
                println!("{}", "✓ Ticket distributed".green().bold());
                println!("{}", Table::new(vec![assignment]));
            } else {
                println!("{}", "Nothing to distribute".yellow());
            }
        }

        Commands::Assign {
            ticket_id,
            server_id,
        } => {
            let params = json!({ "ticket_id": ticket_id, "server_id": server_id });
            let assignment: AssignmentView = call(url, "distribute.forced.v1", params).await?;

            println!("{}", "✓ Ticket assigned".green().bold());
            println!("{}", Table::new(vec![assignment]));
        }

        Commands::Complete {
            ticket_id,
            charge,
            note,
        } => {
            let params = json!({ "ticket_id": ticket_id, "charge": charge, "note": note });
            let ticket: TicketView = call(url, "ticket.complete.v1", params).await?;

            println!(
                "{}",
                format!("✓ Ticket {} finished", ticket.id).green().bold()
            );
            println!("  {} {}", "Client:".bold(), ticket.requester_name);
            println!("  {} {}", "Service:".bold(), ticket.service_name);
            println!("  {} {}", "Charge:".bold(), money(ticket.charge));
        }

        Commands::Cancel { ticket_id, reason } => {
            let params = json!({ "ticket_id": ticket_id, "reason": reason });
            let ticket: TicketView = call(url, "ticket.cancel.v1", params).await?;

            println!("{}", format!("✓ Ticket {} cancelled", ticket.id).green().bold());
            if let Some(server_id) = ticket.server_id {
                println!("  {} {}", "Released server:".bold(), server_id);
            }
            println!("  {} {}", "Status:".bold(), ticket.status);
        }

        Commands::Servers => {
            let list: ServerList = call(url, "server.list.v1", json!({})).await?;

            let rows = server_rows(&list);
            if rows.is_empty() {
                println!("{}", "No servers registered".yellow());
            } else {
                println!("{}", Table::new(rows));
            }
            match &list.next_available {
                Some(s) => println!("  {} {}", "Next up:".bold(), s.name.green()),
                None => println!("  {} {}", "Next up:".bold(), "nobody idle".dimmed()),
            }
        }

        Commands::Register { name } => {
            let server: ServerView = call(url, "server.register.v1", json!({ "name": name })).await?;

            println!("{}", format!("✓ Server {} registered", server.name).green().bold());
            println!("  {} {}", "ID:".bold(), server.id);
        }

        Commands::Activate { server_id } => {
            let params = json!({ "server_id": server_id, "active": true });
            let server: ServerView = call(url, "server.set_active.v1", params).await?;
            println!("{}", format!("✓ Server {} activated", server.name).green().bold());
        }

        Commands::Deactivate { server_id } => {
            let params = json!({ "server_id": server_id, "active": false });
            let server: ServerView = call(url, "server.set_active.v1", params).await?;
            println!("{}", format!("✓ Server {} deactivated", server.name).green().bold());
        }

        Commands::CheckIn { server_id } => {
            let result = call_rpc(url, "server.check_in.v1", json!({ "server_id": server_id })).await?;

            println!("{}", format!("✓ Server {} checked in", server_id).green().bold());
            println!("  {} {}", "Arrival rank:".bold(), result["arrival_rank"]);
        }

        Commands::CheckOut { server_id } => {
            let server: ServerView =
                call(url, "server.check_out.v1", json!({ "server_id": server_id })).await?;

            println!("{}", format!("✓ Server {} checked out", server.name).green().bold());
            println!("  {} {}", "Served today:".bold(), server.daily_served_count);
        }

        Commands::Reset => {
            let result = call_rpc(url, "admin.reset_daily.v1", json!({})).await?;

            println!("{}", "✓ Daily reset applied".green().bold());
            println!("  {} {}", "Servers reset:".bold(), result["servers_reset"]);
        }

        Commands::Status => {
            println!("{}", "Counter Status".cyan().bold());
            println!();

            match call_rpc(url, "admin.stats.v1", json!({})).await {
                Ok(stats) => {
                    println!("  {} {}", "RPC URL:".bold(), url);
                    println!("  {} {}", "Status:".bold(), "ONLINE".green());
                    println!();
                    println!("  {} {}", "Waiting:".bold(), stats["waiting"]);
                    println!("  {} {}", "In service:".bold(), stats["in_service"]);
                    println!("  {} {}", "Finished:".bold(), stats["finished"]);
                    println!("  {} {}", "Cancelled:".bold(), stats["cancelled"]);
                    println!();
                    println!("  {} {}", "Servers idle:".bold(), stats["servers_idle"]);
                    println!("  {} {}", "Servers serving:".bold(), stats["servers_serving"]);
                    println!("  {} {}", "Servers absent:".bold(), stats["servers_absent"]);
                    println!("  {} {} seconds", "Uptime:".bold(), stats["uptime_seconds"]);
                }
                Err(e) => {
                    println!("  {} {}", "Status:".bold(), "ERROR".red());
                    println!("  {} {}", "Error:".bold(), e);
                }
            }
        }

        Commands::Audit => {
            let report: AuditView = call(url, "admin.audit.v1", json!({})).await?;

            println!(
                "  {} {} tickets in service, {} servers serving, {} present",
                "Checked:".bold(),
                report.tickets_in_service,
                report.servers_serving,
                report.servers_present
            );
            if report.consistent {
                println!("  {} consistent", "✓".green());
            } else {
                for violation in &report.violations {
                    println!("  {} {}", "✗".red(), violation);
                }
                anyhow::bail!("{} inconsistencies found", report.violations.len());
            }
        }
    }

    Ok(())
}
