//! Line-oriented front-end for the search flow.

use aqi_ui::{SearchEvent, SearchModel};
use tokio::io::{AsyncBufReadExt, BufReader};

const HELP: &str = "\
Type a place name to search. Commands:
  :select N   show readings for option N
  :filter     toggle the prefix filter
  :clear      reset everything
  :help       show this help
  :quit       exit";

#[derive(Debug, PartialEq, Eq)]
enum Input {
    Query(String),
    Select(usize),
    ToggleFilter,
    Clear,
    Help,
    Quit,
    Unknown(String),
}

fn parse_input(line: &str) -> Input {
    let line = line.trim_end_matches(['\r', '\n']);
    let Some(command) = line.strip_prefix(':') else {
        return Input::Query(line.to_string());
    };

    let mut parts = command.split_whitespace();
    match (parts.next(), parts.next()) {
        (Some("select" | "s"), Some(n)) => match n.parse::<usize>() {
            Ok(n) if n > 0 => Input::Select(n),
            _ => Input::Unknown(line.to_string()),
        },
        (Some("filter" | "f"), None) => Input::ToggleFilter,
        (Some("clear" | "c"), None) => Input::Clear,
        (Some("help" | "h"), None) => Input::Help,
        (Some("quit" | "q"), None) => Input::Quit,
        _ => Input::Unknown(line.to_string()),
    }
}

fn render(model: &SearchModel) {
    println!("\n{}", model.view());
}

/// Drive the model from stdin until `:quit` or end of input.
pub async fn run(mut model: SearchModel) -> std::io::Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    println!("{}", HELP);
    render(&model);

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                match parse_input(&line) {
                    Input::Query(query) => {
                        model.set_query(query);
                    }
                    Input::Select(n) => {
                        let id = model.visible_places().get(n - 1).map(|p| p.id.clone());
                        match id {
                            Some(id) => {
                                model.select_place(id);
                                render(&model);
                            }
                            None => println!("No option {}", n),
                        }
                    }
                    Input::ToggleFilter => {
                        model.toggle_prefix_filter();
                        render(&model);
                    }
                    Input::Clear => {
                        model.reset();
                        render(&model);
                    }
                    Input::Help => println!("{}", HELP),
                    Input::Quit => break,
                    Input::Unknown(text) => println!("Unknown command {:?}, try :help", text),
                }
            }
            event = model.next_event() => {
                match event {
                    Some(SearchEvent::Ignored) => {}
                    Some(_) => render(&model),
                    None => break,
                }
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_text_is_a_query() {
        assert_eq!(parse_input("New York\n"), Input::Query("New York".into()));
        assert_eq!(parse_input(""), Input::Query(String::new()));
    }

    #[test]
    fn commands_parse() {
        assert_eq!(parse_input(":select 2"), Input::Select(2));
        assert_eq!(parse_input(":s 1"), Input::Select(1));
        assert_eq!(parse_input(":filter"), Input::ToggleFilter);
        assert_eq!(parse_input(":clear"), Input::Clear);
        assert_eq!(parse_input(":q"), Input::Quit);
    }

    #[test]
    fn bad_commands_are_unknown() {
        assert!(matches!(parse_input(":select 0"), Input::Unknown(_)));
        assert!(matches!(parse_input(":select x"), Input::Unknown(_)));
        assert!(matches!(parse_input(":dance"), Input::Unknown(_)));
    }
}
