//! Campus CLI
//!
//! Command-line client for the Campus API:
//! - Sign in and out
//! - Browse courses, enroll and drop
//! - Check attendance and announcements
//! - Ask the study assistant

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use reqwest::{Method, RequestBuilder, Response};
use serde_json::{json, Value};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "campus-cli")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Command-line client for the Campus portal")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// API server URL
    #[arg(long, default_value = "http://localhost:8090", global = true)]
    pub api_url: String,

    /// Output format (table, json)
    #[arg(short, long, default_value = "table", global = true)]
    pub format: String,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Sign in and remember the session token
    Login {
        email: String,
        password: String,
    },

    /// Sign out and forget the session token
    Logout,

    /// List courses
    Courses {
        /// Search code, title, instructor or department
        #[arg(short, long)]
        search: Option<String>,
        /// Department tab ("all" for every department)
        #[arg(short, long)]
        department: Option<String>,
        #[arg(short, long, default_value = "1")]
        page: usize,
    },

    /// Enroll in a course
    Enroll {
        /// Course code
        code: String,
    },

    /// Drop a course
    Drop {
        /// Course code
        code: String,
    },

    /// Show attendance, overall or for one course
    Attendance {
        #[arg(short, long)]
        course: Option<String>,
    },

    /// List announcements
    Announcements {
        #[arg(short, long)]
        search: Option<String>,
        /// Type tab: general, academic, exam, event, administrative
        #[arg(short = 't', long = "type")]
        kind: Option<String>,
        #[arg(short, long, default_value = "1")]
        page: usize,
    },

    /// Ask the study assistant a question
    Ask {
        question: Vec<String>,
    },

    /// Generate default config file
    Config {
        /// Output path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

/// Where the session token is kept between invocations
fn token_path() -> PathBuf {
    dirs::config_dir()
        .map(|p| p.join("campus"))
        .unwrap_or_else(|| PathBuf::from("."))
        .join("cli-token")
}

fn load_token() -> Result<String> {
    let path = token_path();
    let token = std::fs::read_to_string(&path)
        .with_context(|| format!("Not signed in (no token at {:?}); run `campus-cli login`", path))?;
    Ok(token.trim().to_string())
}

struct Api {
    client: reqwest::Client,
    base: String,
}

impl Api {
    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.client
            .request(method, format!("{}/api/v1{}", self.base.trim_end_matches('/'), path))
    }

    fn authed(&self, method: Method, path: &str) -> Result<RequestBuilder> {
        Ok(self.request(method, path).bearer_auth(load_token()?))
    }
}

/// Body of a successful response, or the server's error message
async fn read_json(response: Response) -> Result<Value> {
    let status = response.status();
    let body: Value = response.json().await.unwrap_or(Value::Null);
    if status.is_success() {
        return Ok(body);
    }

    let message = body["error"]["message"].as_str().unwrap_or("request failed");
    let mut detail = String::new();
    if let Some(fields) = body["error"]["fields"].as_array() {
        for f in fields {
            detail.push_str(&format!(
                "\n  {}: {}",
                f["field"].as_str().unwrap_or("?"),
                f["message"].as_str().unwrap_or("")
            ));
        }
    }
    if body["error"]["retryable"].as_bool().unwrap_or(false) {
        detail.push_str("\n  (temporary failure, try again)");
    }
    bail!("{} ({}){}", message, status, detail)
}

fn list_params(search: Option<String>, category: Option<String>, page: usize) -> Vec<(&'static str, String)> {
    let mut params = vec![("page", page.to_string())];
    if let Some(s) = search {
        params.push(("search", s));
    }
    if let Some(c) = category {
        params.push(("category", c));
    }
    params
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let api = Api {
        client: reqwest::Client::new(),
        base: cli.api_url.clone(),
    };
    let as_json = cli.format == "json";

    match cli.command {
        Commands::Login { email, password } => {
            let response = api
                .request(Method::POST, "/auth/login")
                .json(&json!({ "email": email, "password": password }))
                .send()
                .await?;
            let body = read_json(response).await?;
            let token = body["token"].as_str().context("response carried no token")?;

            let path = token_path();
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(&path, token)?;

            println!(
                "Signed in as {} ({})",
                body["user"]["name"].as_str().unwrap_or("?"),
                body["user"]["role"].as_str().unwrap_or("?")
            );
        }

        Commands::Logout => {
            let response = api.authed(Method::POST, "/auth/logout")?.send().await?;
            if !response.status().is_success() {
                read_json(response).await?;
            }
            std::fs::remove_file(token_path())?;
            println!("Signed out");
        }

        Commands::Courses {
            search,
            department,
            page,
        } => {
            let response = api
                .authed(Method::GET, "/courses")?
                .query(&list_params(search, department, page))
                .send()
                .await?;
            let body = read_json(response).await?;

            if as_json {
                println!("{}", serde_json::to_string_pretty(&body)?);
            } else {
                println!("{:<8} {:<32} {:>3}  {:<20} {}", "Code", "Title", "Cr", "Instructor", "Schedule");
                println!("{}", "-".repeat(90));
                for c in body["items"].as_array().into_iter().flatten() {
                    println!(
                        "{:<8} {:<32} {:>3}  {:<20} {}",
                        c["code"].as_str().unwrap_or(""),
                        c["title"].as_str().unwrap_or(""),
                        c["credits"].as_u64().unwrap_or(0),
                        c["instructor"].as_str().unwrap_or(""),
                        c["schedule"].as_str().unwrap_or("")
                    );
                }
                print_page_footer(&body);
            }
        }

        Commands::Enroll { code } => {
            let response = api
                .authed(Method::POST, &format!("/enrollments/{}", urlencoding::encode(&code)))?
                .send()
                .await?;
            let body = read_json(response).await?;
            println!(
                "Enrolled in {}. Total credits: {}",
                code.to_uppercase(),
                body["total_credits"].as_u64().unwrap_or(0)
            );
        }

        Commands::Drop { code } => {
            let response = api
                .authed(Method::DELETE, &format!("/enrollments/{}", urlencoding::encode(&code)))?
                .send()
                .await?;
            let body = read_json(response).await?;
            println!(
                "Dropped {}. Total credits: {}",
                code.to_uppercase(),
                body["total_credits"].as_u64().unwrap_or(0)
            );
        }

        Commands::Attendance { course } => {
            let body = match &course {
                Some(code) => {
                    let response = api
                        .authed(Method::GET, "/attendance")?
                        .query(&[("course", code)])
                        .send()
                        .await?;
                    read_json(response).await?
                }
                None => {
                    let response = api.authed(Method::GET, "/attendance/summary")?.send().await?;
                    read_json(response).await?
                }
            };

            if as_json {
                println!("{}", serde_json::to_string_pretty(&body)?);
            } else if course.is_some() {
                for r in body["records"].as_array().into_iter().flatten() {
                    println!(
                        "{}  {}-{}  {:<8} {}",
                        r["date"].as_str().unwrap_or(""),
                        r["start_time"].as_str().unwrap_or(""),
                        r["end_time"].as_str().unwrap_or(""),
                        r["status"].as_str().unwrap_or(""),
                        r["reason"].as_str().unwrap_or("")
                    );
                }
                print_summary("Overall", &body["summary"]);
            } else {
                for c in body["courses"].as_array().into_iter().flatten() {
                    print_summary(c["course_code"].as_str().unwrap_or("?"), &c["summary"]);
                }
                print_summary("Overall", &body["overall"]);
            }
        }

        Commands::Announcements { search, kind, page } => {
            let response = api
                .authed(Method::GET, "/announcements")?
                .query(&list_params(search, kind, page))
                .send()
                .await?;
            let body = read_json(response).await?;

            if as_json {
                println!("{}", serde_json::to_string_pretty(&body)?);
            } else {
                for a in body["items"].as_array().into_iter().flatten() {
                    let marker = if a["important"].as_bool().unwrap_or(false) { "!" } else { " " };
                    println!(
                        "{} [{}] {} ({})",
                        marker,
                        a["type"].as_str().unwrap_or(""),
                        a["title"].as_str().unwrap_or(""),
                        a["author"].as_str().unwrap_or("")
                    );
                    println!("    {}", a["body"].as_str().unwrap_or(""));
                }
                print_page_footer(&body);
            }
        }

        Commands::Ask { question } => {
            let question = question.join(" ");
            let response = api
                .authed(Method::POST, "/assistant")?
                .json(&json!({ "question": question }))
                .send()
                .await?;
            let body = read_json(response).await?;

            if as_json {
                println!("{}", serde_json::to_string_pretty(&body)?);
            } else {
                println!("{}", body["answer"].as_str().unwrap_or(""));
                if let Some(data) = body["supporting_data"].as_object() {
                    if !data.is_empty() {
                        println!();
                        for (k, v) in data {
                            println!("  {:<24} {}", k, v);
                        }
                    }
                }
                let suggestions = body["suggestions"].as_array().cloned().unwrap_or_default();
                if !suggestions.is_empty() {
                    println!("\nSuggestions:");
                    for s in suggestions {
                        println!("  - {}", s.as_str().unwrap_or(""));
                    }
                }
            }
        }

        Commands::Config { output } => {
            let config = campus::config::generate_default_config();

            match output {
                Some(path) => {
                    if let Some(parent) = path.parent() {
                        std::fs::create_dir_all(parent)?;
                    }
                    std::fs::write(&path, &config)?;
                    println!("Config written to {:?}", path);
                }
                None => {
                    print!("{}", config);
                }
            }
        }
    }

    Ok(())
}

fn print_summary(label: &str, summary: &Value) {
    let standing = summary["standing"].as_str().unwrap_or("");
    let mut line = format!(
        "{:<8} {:>3}%  {}/{} attended  {}",
        label,
        summary["percentage"].as_u64().unwrap_or(0),
        summary["attended"].as_u64().unwrap_or(0),
        summary["total"].as_u64().unwrap_or(0),
        standing
    );
    match summary["sessions_needed"].as_u64() {
        Some(0) => {}
        Some(needed) => line.push_str(&format!("  (attend the next {} to recover)", needed)),
        None => line.push_str("  (threshold out of reach)"),
    }
    println!("{}", line);
}

fn print_page_footer(body: &Value) {
    println!(
        "\nPage {} of {} ({} total)",
        body["page"].as_u64().unwrap_or(1),
        body["total_pages"].as_u64().unwrap_or(0),
        body["total_items"].as_u64().unwrap_or(0)
    );
}
