//! Terminal commands and their mapping onto session intents.

use client_core::Intent;
use shared::domain::{DraftField, ProductId};

pub const HELP: &str = "\
commands:
  list                      show the catalog and editor
  add                       open the editor for a new product
  edit <id>                 open the editor on an existing product
  set <field> <value>       change name, price or description in the draft
  save                      submit the draft
  cancel                    close the editor and drop the draft
  delete <id>               delete a product
  reload                    fetch the catalog again
  help                      show this text
  quit                      leave";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Intent(Intent),
    List,
    Help,
    Quit,
}

pub fn parse_command(line: &str) -> Result<Option<Command>, String> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }
    let (verb, rest) = match line.split_once(char::is_whitespace) {
        Some((verb, rest)) => (verb, rest.trim()),
        None => (line, ""),
    };

    let command = match verb.to_ascii_lowercase().as_str() {
        "list" | "ls" => Command::List,
        "help" | "?" => Command::Help,
        "quit" | "exit" | "q" => Command::Quit,
        "add" | "new" => Command::Intent(Intent::OpenAdd),
        "save" | "submit" => Command::Intent(Intent::Submit),
        "cancel" | "close" => Command::Intent(Intent::Cancel),
        "reload" => Command::Intent(Intent::Initialize),
        "edit" => Command::Intent(Intent::OpenEdit(required_id(verb, rest)?)),
        "delete" | "rm" => Command::Intent(Intent::Delete(required_id(verb, rest)?)),
        "set" => {
            let (field, value) = rest
                .split_once(char::is_whitespace)
                .map(|(field, value)| (field, value.trim()))
                .unwrap_or((rest, ""));
            if field.is_empty() {
                return Err("usage: set <name|price|description> <value>".to_string());
            }
            let field = field.parse::<DraftField>()?;
            Command::Intent(Intent::EditField {
                field,
                value: value.to_string(),
            })
        }
        other => return Err(format!("unknown command '{other}'; type 'help'")),
    };
    Ok(Some(command))
}

fn required_id(verb: &str, rest: &str) -> Result<ProductId, String> {
    match rest.split_whitespace().next() {
        Some(id) => Ok(ProductId::from(id)),
        None => Err(format!("usage: {verb} <id>")),
    }
}
