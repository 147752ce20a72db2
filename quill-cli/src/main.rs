use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use quill_client::{BlogClient, Credential};
use std::fs;
use std::path::PathBuf;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Server base URL (default: http://localhost:5000)
    #[arg(short, long)]
    server: Option<String>,

    /// Where the signed-in credential is stored between invocations
    #[arg(long)]
    credentials_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Register a new account
    Signup {
        #[arg(short, long)]
        name: String,

        #[arg(short, long)]
        email: String,

        #[arg(short, long)]
        password: String,

        /// "user" (default) or "admin"
        #[arg(short, long)]
        role: Option<String>,
    },

    /// Sign in and store the credential
    Signin {
        #[arg(short, long)]
        email: String,

        #[arg(short, long)]
        password: String,
    },

    /// Show the stored credential
    Status,

    /// List all blogs
    List,

    /// Create a new blog
    Create {
        #[arg(short, long)]
        title: String,

        #[arg(short, long)]
        content: String,
    },

    /// Update a blog you own (admins may update any)
    Update {
        #[arg(short, long)]
        id: i64,

        #[arg(short, long)]
        title: String,

        #[arg(short, long)]
        content: String,
    },

    /// Delete a blog (admins only)
    Delete {
        #[arg(short, long)]
        id: i64,
    },

    /// Forget the stored credential
    Logout,
}

struct CredentialStore {
    path: PathBuf,
}

impl CredentialStore {
    fn new(custom_path: Option<PathBuf>) -> Result<Self> {
        let path = match custom_path {
            Some(path) => path,
            None => {
                let home = dirs::home_dir().context("Failed to get home directory")?;
                home.join(".quill").join("credentials.json")
            }
        };

        Ok(Self { path })
    }

    fn save(&self, credential: &Credential) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {:?}", parent))?;
        }

        let json = serde_json::to_string_pretty(credential)?;
        fs::write(&self.path, json)
            .with_context(|| format!("Failed to save credential to {:?}", self.path))?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mut perms = fs::metadata(&self.path)?.permissions();
            perms.set_mode(0o600);
            fs::set_permissions(&self.path, perms)?;
        }

        println!("✓ Credential saved to {:?}", self.path);
        Ok(())
    }

    fn load(&self) -> Result<Option<Credential>> {
        match fs::read_to_string(&self.path) {
            Ok(json) => {
                let credential = serde_json::from_str(&json)
                    .with_context(|| format!("Corrupt credential file {:?}", self.path))?;
                Ok(Some(credential))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e).context("Failed to read credential file"),
        }
    }

    fn clear(&self) -> Result<()> {
        if self.path.exists() {
            fs::remove_file(&self.path)
                .with_context(|| format!("Failed to remove credential file {:?}", self.path))?;
            println!("✓ Credential file removed");
        }
        Ok(())
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let base_url = cli
        .server
        .unwrap_or_else(|| "http://localhost:5000".to_string());

    println!("🔌 Connecting to: {}", base_url);

    let mut client = BlogClient::new(base_url);

    let store = CredentialStore::new(cli.credentials_file)?;
    if let Some(credential) = store.load()? {
        client.set_credential(credential);
        println!("🔑 Authenticated with saved credential");
    }

    match &cli.command {
        Commands::Signup {
            name,
            email,
            password,
            role,
        } => {
            println!("📝 Registering account: {}", email);

            match client.signup(name, email, password, role.clone()).await {
                Ok(account) => {
                    println!("✅ Registration successful!");
                    println!("   Account ID: {}", account.id);
                    println!("   Name: {}", account.name);
                    println!("   Email: {}", account.email);
                    println!("   Role: {:?}", account.role);
                    println!("\n   Sign in next: quill-cli signin --email <email> --password <password>");
                }
                Err(e) => {
                    if e.is_conflict() {
                        println!("❌ Registration failed: email already registered");
                    } else {
                        println!("❌ Registration failed: {}", e);
                    }
                    std::process::exit(1);
                }
            }
        }

        Commands::Signin { email, password } => {
            println!("🔑 Signing in as: {}", email);

            match client.signin(email, password).await {
                Ok(credential) => {
                    println!("✅ Signin successful!");
                    println!("   Account ID: {}", credential.account.id);
                    println!("   Name: {}", credential.account.name);
                    println!("   Email: {}", credential.account.email);
                    println!("   Role: {:?}", credential.account.role);

                    store.save(&credential)?;
                }
                Err(e) => {
                    println!("❌ Signin failed: {}", e);
                    std::process::exit(1);
                }
            }
        }

        Commands::Status => match store.load()? {
            Some(credential) => {
                println!("🔑 Credential file: {:?}", store.path);
                println!("   Account: {} <{}>", credential.account.name, credential.account.email);
                println!("   Role: {:?}", credential.account.role);
                println!("   Token: {}...", &credential.token[..credential.token.len().min(20)]);
            }
            None => {
                println!("❌ No credential found");
                println!("   Please sign in first: quill-cli signin --email <email> --password <password>");
            }
        },

        Commands::List => {
            println!("📋 Listing blogs");

            match client.list_blogs().await {
                Ok(response) => {
                    println!("✅ Found {} blogs", response.count);
                    println!();

                    if response.blogs.is_empty() {
                        println!("   No blogs yet");
                        println!("   Tip: create the first one: quill-cli create --title \"My Post\" --content \"Hello\"");
                    } else {
                        let credential = client.credential();
                        for (i, blog) in response.blogs.iter().enumerate() {
                            println!("   {}. [{}] {}", i + 1, blog.id, blog.title);
                            println!("      By: {} <{}>", blog.author_name, blog.author_email);
                            println!("      Created: {}", blog.created_at);
                            println!("      Content: {}", truncate(&blog.content, 50));
                            if let Some(credential) = credential {
                                println!("      Actions: {}", action_hints(credential, blog.account_id));
                            }
                            println!();
                        }
                    }
                }
                Err(e) => {
                    println!("❌ Failed to list blogs: {}", e);
                    std::process::exit(1);
                }
            }
        }

        Commands::Create { title, content } => {
            println!("📝 Creating new blog...");

            match client.create_blog(title, content).await {
                Ok(blog) => {
                    println!("✅ Blog created successfully!");
                    println!("   ID: {}", blog.id);
                    println!("   Title: {}", blog.title);
                    println!("   Owner ID: {}", blog.account_id);
                    println!("   Created: {}", blog.created_at);
                }
                Err(e) => {
                    if e.is_unauthorized() {
                        println!("❌ Unauthorized. Please sign in first:");
                        println!("   quill-cli signin --email <email> --password <password>");
                    } else {
                        println!("❌ Failed to create blog: {}", e);
                    }
                    std::process::exit(1);
                }
            }
        }

        Commands::Update { id, title, content } => {
            println!("✏️ Updating blog #{}", id);

            match client.update_blog(*id, title, content).await {
                Ok(blog) => {
                    println!("✅ Blog updated successfully!");
                    println!("   ID: {}", blog.id);
                    println!("   Title: {}", blog.title);
                    println!("   Content: {}", blog.content);
                    println!("   Updated: {}", blog.updated_at);
                }
                Err(e) => {
                    if e.is_not_found() {
                        println!("❌ Blog #{} not found", id);
                    } else if e.is_forbidden() {
                        println!("❌ Forbidden. Only the owner or an admin may update this blog");
                    } else if e.is_unauthorized() {
                        println!("❌ Unauthorized. Please sign in again");
                    } else {
                        println!("❌ Failed to update blog: {}", e);
                    }
                    std::process::exit(1);
                }
            }
        }

        Commands::Delete { id } => {
            println!("🗑️ Deleting blog #{}", id);

            match client.delete_blog(*id).await {
                Ok(()) => {
                    println!("✅ Blog deleted successfully!");
                }
                Err(e) => {
                    if e.is_not_found() {
                        println!("❌ Blog #{} not found", id);
                    } else if e.is_forbidden() {
                        println!("❌ Forbidden. Only admins may delete blogs");
                    } else if e.is_unauthorized() {
                        println!("❌ Unauthorized. Please sign in again");
                    } else {
                        println!("❌ Failed to delete blog: {}", e);
                    }
                    std::process::exit(1);
                }
            }
        }

        Commands::Logout => {
            store.clear()?;
            println!("✅ Signed out");
        }
    }

    Ok(())
}

/// Advisory hints only; the server decides for real on every request.
fn action_hints(credential: &Credential, owner_id: i64) -> String {
    let mut actions = Vec::new();
    if credential.can_edit(owner_id) {
        actions.push("edit");
    }
    if credential.can_delete() {
        actions.push("delete");
    }
    if actions.is_empty() {
        "none".to_string()
    } else {
        actions.join(", ")
    }
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        format!("{}...", s.chars().take(max_len).collect::<String>())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use quill_client::{AccountInfo, Role};

    fn credential(id: i64, role: Role) -> Credential {
        Credential {
            token: "token-value".to_string(),
            account: AccountInfo {
                id,
                name: "Alice".to_string(),
                email: "alice@example.com".to_string(),
                role,
                created_at: Utc::now(),
            },
        }
    }

    #[test]
    fn credential_store_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = CredentialStore::new(Some(dir.path().join("credentials.json"))).unwrap();

        assert!(store.load().unwrap().is_none());

        let credential = credential(1, Role::User);
        store.save(&credential).unwrap();
        assert_eq!(store.load().unwrap(), Some(credential));

        store.clear().unwrap();
        assert!(store.load().unwrap().is_none());
    }

    #[test]
    fn action_hints_follow_role_and_ownership() {
        assert_eq!(action_hints(&credential(1, Role::User), 1), "edit");
        assert_eq!(action_hints(&credential(2, Role::User), 1), "none");
        assert_eq!(action_hints(&credential(3, Role::Admin), 1), "edit, delete");
    }

    #[test]
    fn truncate_keeps_short_strings() {
        assert_eq!(truncate("short", 50), "short");
        assert_eq!(truncate(&"x".repeat(60), 50), format!("{}...", "x".repeat(50)));
    }
}
