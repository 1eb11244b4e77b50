//! Command parsing and execution for the interactive front end

use std::str::FromStr;
use std::sync::Arc;

use todo_dispatch::{DispatchStore, Runtime, ThunkError};

use crate::action::AppAction;
use crate::api::TodoApi;
use crate::error::ParseError;
use crate::filters::{ColorChange, FiltersAction, StatusFilter};
use crate::model::{is_available_color, ItemId};
use crate::selectors::TodoSelectors;
use crate::state::AppState;
use crate::thunks::{FetchTodos, SaveNewTodo};
use crate::todos::{self, TodosAction};
use crate::view;

pub const HELP: &str = "\
Commands:
  add <text>                   create a todo
  toggle <id>                  mark done / not done
  color <id> <color|none>      set or clear the color
  delete <id>                  remove a todo
  show <all|active|completed>  filter by status
  filter +<color> | -<color>   add or remove a color filter
  fetch                        reload from the backend
  list                         show the list again
  help                         this text
  quit                         exit";

/// A parsed REPL line.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    Add(String),
    Toggle(ItemId),
    Color { id: ItemId, color: Option<String> },
    Delete(ItemId),
    Show(StatusFilter),
    Filter { color: String, change: ColorChange },
    Fetch,
    List,
    Help,
    Quit,
}

fn parse_id(arg: Option<&str>, command: &'static str) -> Result<ItemId, ParseError> {
    let arg = arg.ok_or(ParseError::MissingArgument {
        command,
        expected: "a todo id",
    })?;
    arg.trim_start_matches('#')
        .parse::<u64>()
        .map(ItemId)
        .map_err(|_| ParseError::InvalidId(arg.to_string()))
}

fn parse_color(color: &str) -> Result<String, ParseError> {
    let color = color.to_ascii_lowercase();
    if is_available_color(&color) {
        Ok(color)
    } else {
        Err(ParseError::UnknownColor(color))
    }
}

impl FromStr for Command {
    type Err = ParseError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim();
        let (word, rest) = match line.split_once(char::is_whitespace) {
            Some((word, rest)) => (word, rest.trim()),
            None => (line, ""),
        };
        let mut args = rest.split_whitespace();

        match word.to_ascii_lowercase().as_str() {
            "" => Err(ParseError::Empty),
            "add" if rest.is_empty() => Err(ParseError::MissingArgument {
                command: "add",
                expected: "some text",
            }),
            "add" => Ok(Command::Add(rest.to_string())),
            "toggle" => parse_id(args.next(), "toggle").map(Command::Toggle),
            "delete" => parse_id(args.next(), "delete").map(Command::Delete),
            "color" => {
                let id = parse_id(args.next(), "color")?;
                let color = match args.next() {
                    None => {
                        return Err(ParseError::MissingArgument {
                            command: "color",
                            expected: "a color or `none`",
                        })
                    }
                    Some(c) if c.eq_ignore_ascii_case("none") => None,
                    Some(c) => Some(parse_color(c)?),
                };
                Ok(Command::Color { id, color })
            }
            "show" => {
                let arg = args.next().ok_or(ParseError::MissingArgument {
                    command: "show",
                    expected: "all, active or completed",
                })?;
                StatusFilter::parse(arg)
                    .map(Command::Show)
                    .ok_or_else(|| ParseError::InvalidStatus(arg.to_string()))
            }
            "filter" => {
                let arg = args.next().ok_or(ParseError::MissingArgument {
                    command: "filter",
                    expected: "+color or -color",
                })?;
                let (change, color) = if let Some(color) = arg.strip_prefix('+') {
                    (ColorChange::Added, color)
                } else if let Some(color) = arg.strip_prefix('-') {
                    (ColorChange::Removed, color)
                } else {
                    return Err(ParseError::InvalidColorChange(arg.to_string()));
                };
                Ok(Command::Filter {
                    color: parse_color(color)?,
                    change,
                })
            }
            "fetch" => Ok(Command::Fetch),
            "list" | "ls" => Ok(Command::List),
            "help" | "?" => Ok(Command::Help),
            "quit" | "exit" | "q" => Ok(Command::Quit),
            other => Err(ParseError::UnknownCommand(other.to_string())),
        }
    }
}

/// What the front end should do after a command.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Reply {
    Text(String),
    Quit,
}

/// Runtime, selectors and backend behind one REPL.
pub struct Session<St: DispatchStore<AppState, AppAction>> {
    runtime: Runtime<AppState, AppAction, St>,
    selectors: TodoSelectors,
    api: Arc<dyn TodoApi>,
}

impl<St: DispatchStore<AppState, AppAction>> Session<St> {
    pub fn new(
        runtime: Runtime<AppState, AppAction, St>,
        selectors: TodoSelectors,
        api: Arc<dyn TodoApi>,
    ) -> Self {
        Self {
            runtime,
            selectors,
            api,
        }
    }

    pub fn state(&self) -> &AppState {
        self.runtime.state()
    }

    pub fn selectors(&self) -> &TodoSelectors {
        &self.selectors
    }

    /// Render the list and footer for the current state.
    pub fn render(&mut self) -> String {
        view::render(self.runtime.state(), &mut self.selectors)
    }

    /// Run one command.
    ///
    /// Commands naming an unknown id fail before anything is dispatched.
    /// Backend failures are returned once the runtime has settled.
    pub async fn execute(&mut self, command: Command) -> anyhow::Result<Reply> {
        self.execute_with(command, |_| {}).await
    }

    /// Like [`execute`](Self::execute), passing intermediate output to
    /// `progress` while waiting on the backend.
    ///
    /// When a load starts, `progress` receives the loader line once.
    pub async fn execute_with<F>(
        &mut self,
        command: Command,
        mut progress: F,
    ) -> anyhow::Result<Reply>
    where
        F: FnMut(&str),
    {
        match command {
            Command::Add(text) => {
                self.runtime
                    .dispatch(SaveNewTodo::new(Arc::clone(&self.api), text));
                self.settle(&mut progress).await?;
            }
            Command::Toggle(id) => {
                self.dispatch_checked(TodosAction::ToggleCompleted(id))?;
            }
            Command::Color { id, color } => {
                self.dispatch_checked(TodosAction::SetColor { id, color })?;
            }
            Command::Delete(id) => {
                self.state().todos.require(id)?;
                self.runtime.dispatch(TodosAction::Delete(id));
            }
            Command::Show(status) => {
                self.runtime.dispatch(FiltersAction::SetStatus(status));
            }
            Command::Filter { color, change } => {
                self.runtime
                    .dispatch(FiltersAction::ChangeColor { color, change });
            }
            Command::Fetch => {
                self.runtime.dispatch(FetchTodos::new(Arc::clone(&self.api)));
                self.settle(&mut progress).await?;
            }
            Command::List => {}
            Command::Help => return Ok(Reply::Text(HELP.to_string())),
            Command::Quit => return Ok(Reply::Quit),
        }
        Ok(Reply::Text(self.render()))
    }

    async fn settle<F: FnMut(&str)>(&mut self, progress: &mut F) -> Result<(), ThunkError> {
        let selectors = &mut self.selectors;
        let mut was_loading = self.runtime.state().todos.is_loading();
        self.runtime
            .settle_with(|state| {
                let loading = state.todos.is_loading();
                if loading && !was_loading {
                    progress(&view::render_list(state, selectors));
                }
                was_loading = loading;
            })
            .await
    }

    fn dispatch_checked(&mut self, action: TodosAction) -> anyhow::Result<()> {
        let action = todos::checked(&self.state().todos, action)?;
        self.runtime.dispatch(action);
        Ok(())
    }

    /// Cancel whatever is still running.
    pub fn shutdown(&mut self) {
        self.runtime.shutdown();
    }
}
