//! The `quizzki login`, `logout` and `whoami` commands.

use anyhow::Result;

use quizzki_core::auth;
use quizzki_core::session::Role;

use super::Context;

pub async fn execute(ctx: &Context, role: Role, email: &str, password: &str) -> Result<()> {
    let api = ctx.api()?;
    let reply = auth::login(&api, role, email, password).await?;
    ctx.store.save(&reply.data)?;

    if !reply.message.is_empty() {
        println!("{}", reply.message);
    }
    println!("Signed in as {role} {} → {}", reply.data.id, role.dashboard());
    Ok(())
}

pub fn logout(ctx: &Context, role: Option<Role>) -> Result<()> {
    let roles = match role {
        Some(role) => vec![role],
        None => vec![Role::Student, Role::Teacher],
    };
    for role in roles {
        if ctx.store.clear(role)? {
            println!("Signed out {role}");
        } else {
            println!("No {role} session");
        }
    }
    Ok(())
}

pub fn whoami(ctx: &Context) -> Result<()> {
    let mut any = false;
    for role in [Role::Student, Role::Teacher] {
        if let Some(session) = ctx.store.load(role)? {
            any = true;
            println!("{role}: id {}", session.id);
        }
    }
    if !any {
        println!("Not signed in. Run `quizzki login`.");
    }
    Ok(())
}
