//! `stockpile register ...`

use anyhow::{Context, Result};
use clap::Args;
use serde_json::Value;
use stockpile_client::InventoryApi;
use stockpile_core::validation::RegistrationForm;

use crate::context::CliContext;

#[derive(Args)]
pub struct RegisterArgs {
    #[arg(long)]
    first_name: String,
    #[arg(long)]
    last_name: String,
    #[arg(long)]
    email: String,
    /// Six or more characters with upper case, lower case and a digit.
    #[arg(long, env = "STOCKPILE_REGISTER_PASSWORD", hide_env_values = true)]
    password: String,
    /// Defaults to employee.
    #[arg(long, default_value = "")]
    role: String,
}

impl RegisterArgs {
    fn into_form(self) -> RegistrationForm {
        RegistrationForm {
            first_name: self.first_name,
            last_name: self.last_name,
            email: self.email,
            password: self.password,
            role: self.role,
        }
    }
}

fn acknowledgement(response: &Value) -> &str {
    response
        .get("message")
        .and_then(Value::as_str)
        .unwrap_or("Account registered")
}

pub async fn run(ctx: &CliContext, args: RegisterArgs) -> Result<()> {
    let registration = args.into_form().validate()?;
    let response = ctx
        .api
        .register(&registration)
        .await
        .with_context(|| format!("failed to register {}", registration.email))?;

    if ctx.json() {
        return ctx.print_json(&response);
    }
    println!("{}", acknowledgement(&response));
    Ok(())
}
