//! Console command grammar. Parsing is pure; execution (and the
//! state-dependent checks such as unknown groups or bookmarks) happens in
//! the app against [`SessionState`](super::SessionState).

pub const HELP_LINES: [&str; 2] = [
    "Commands: help, clear, new, set <graphId>, save, load, list, groups list|hide|show|toggle|showall, og record|save|load, camera capture|list|load|delete|save|sync, focus, collapse, zoomout, find <query>, toggle <panel>.",
    "Panels: add-node, delete-node, add-link, controls.",
];

#[derive(Clone, Debug, PartialEq)]
pub enum ConsoleCommand {
    Help,
    Clear,
    New,
    SetGraphId(String),
    Save,
    Load,
    ListGraphs,
    GroupsList,
    GroupsShowAll,
    GroupHide(String),
    GroupShow(String),
    GroupToggle(String),
    OgRecord,
    OgSave,
    OgLoad,
    CameraCapture(Option<String>),
    CameraList,
    CameraLoad(String),
    CameraDelete(String),
    CameraSave,
    CameraSync,
    ZoomOut,
    FocusMode,
    CollapseMode,
    Find(String),
    TogglePanel(Panel),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Panel {
    AddNode,
    DeleteNode,
    AddLink,
    Controls,
}

impl Panel {
    pub fn name(self) -> &'static str {
        match self {
            Panel::AddNode => "add-node",
            Panel::DeleteNode => "delete-node",
            Panel::AddLink => "add-link",
            Panel::Controls => "controls",
        }
    }
}

/// Splits on whitespace; everything after the subcommand is rejoined with
/// single spaces so multi-word names survive. Errors are the exact line to
/// print back.
pub fn parse(line: &str) -> Result<ConsoleCommand, String> {
    let mut words = line.split_whitespace();
    let Some(action) = words.next() else {
        return Err("Unknown command. Type help.".to_string());
    };
    let rest: Vec<&str> = words.collect();

    match action {
        "help" => Ok(ConsoleCommand::Help),
        "clear" => Ok(ConsoleCommand::Clear),
        "new" => Ok(ConsoleCommand::New),
        "set" => {
            let id = rest.join(" ");
            if id.is_empty() {
                return Err("Usage: set <graphId>".to_string());
            }
            Ok(ConsoleCommand::SetGraphId(id))
        }
        "save" => Ok(ConsoleCommand::Save),
        "load" => Ok(ConsoleCommand::Load),
        "list" => Ok(ConsoleCommand::ListGraphs),
        "groups" => parse_groups(&rest),
        "og" => parse_og(&rest),
        "camera" => parse_camera(&rest),
        "zoomout" => Ok(ConsoleCommand::ZoomOut),
        "focus" => Ok(ConsoleCommand::FocusMode),
        "collapse" => Ok(ConsoleCommand::CollapseMode),
        "find" => {
            let query = rest.join(" ");
            if query.is_empty() {
                return Err("Usage: find <query>".to_string());
            }
            Ok(ConsoleCommand::Find(query))
        }
        "toggle" => match rest.first().copied() {
            Some("add-node") => Ok(ConsoleCommand::TogglePanel(Panel::AddNode)),
            Some("delete-node") => Ok(ConsoleCommand::TogglePanel(Panel::DeleteNode)),
            Some("add-link") => Ok(ConsoleCommand::TogglePanel(Panel::AddLink)),
            Some("controls") => Ok(ConsoleCommand::TogglePanel(Panel::Controls)),
            _ => Err("Unknown panel. Use: add-node, delete-node, add-link, controls.".to_string()),
        },
        _ => Err(format!("Unknown command: {action}. Type help.")),
    }
}

fn parse_groups(rest: &[&str]) -> Result<ConsoleCommand, String> {
    const USAGE: &str = "Usage: groups list | groups hide <name> | groups show <name> | groups toggle <name> | groups showall";
    let sub = match rest.first().copied() {
        None | Some("list") => return Ok(ConsoleCommand::GroupsList),
        Some("showall") => return Ok(ConsoleCommand::GroupsShowAll),
        Some(sub) => sub,
    };
    let name = rest[1..].join(" ");
    if name.is_empty() {
        return Err(USAGE.to_string());
    }
    match sub {
        "hide" => Ok(ConsoleCommand::GroupHide(name)),
        "show" => Ok(ConsoleCommand::GroupShow(name)),
        "toggle" => Ok(ConsoleCommand::GroupToggle(name)),
        _ => Err(USAGE.to_string()),
    }
}

fn parse_og(rest: &[&str]) -> Result<ConsoleCommand, String> {
    match rest.first().copied() {
        Some("record") => Ok(ConsoleCommand::OgRecord),
        Some("save") => Ok(ConsoleCommand::OgSave),
        Some("load") => Ok(ConsoleCommand::OgLoad),
        _ => Err("Usage: og record | og save | og load".to_string()),
    }
}

fn parse_camera(rest: &[&str]) -> Result<ConsoleCommand, String> {
    const USAGE: &str = "Usage: camera capture <name> | camera list | camera load <name> | camera delete <name> | camera save | camera sync";
    let arg = || {
        let joined = rest[1..].join(" ");
        (!joined.is_empty()).then_some(joined)
    };
    match rest.first().copied() {
        Some("capture") => Ok(ConsoleCommand::CameraCapture(arg())),
        Some("list") => Ok(ConsoleCommand::CameraList),
        Some("load") => arg()
            .map(ConsoleCommand::CameraLoad)
            .ok_or_else(|| "Usage: camera load <name>".to_string()),
        Some("delete") => arg()
            .map(ConsoleCommand::CameraDelete)
            .ok_or_else(|| "Usage: camera delete <name>".to_string()),
        Some("save") => Ok(ConsoleCommand::CameraSave),
        Some("sync") => Ok(ConsoleCommand::CameraSync),
        _ => Err(USAGE.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bare_commands() {
        assert_eq!(parse("help"), Ok(ConsoleCommand::Help));
        assert_eq!(parse("clear"), Ok(ConsoleCommand::Clear));
        assert_eq!(parse("new"), Ok(ConsoleCommand::New));
        assert_eq!(parse("save"), Ok(ConsoleCommand::Save));
        assert_eq!(parse("load"), Ok(ConsoleCommand::Load));
        assert_eq!(parse("list"), Ok(ConsoleCommand::ListGraphs));
        assert_eq!(parse("zoomout"), Ok(ConsoleCommand::ZoomOut));
        assert_eq!(parse("focus"), Ok(ConsoleCommand::FocusMode));
        assert_eq!(parse("collapse"), Ok(ConsoleCommand::CollapseMode));
    }

    #[test]
    fn test_set_joins_words_and_requires_id() {
        assert_eq!(
            parse("set my graph"),
            Ok(ConsoleCommand::SetGraphId("my graph".to_string()))
        );
        assert_eq!(parse("set   "), Err("Usage: set <graphId>".to_string()));
    }

    #[test]
    fn test_groups_subcommands() {
        assert_eq!(parse("groups"), Ok(ConsoleCommand::GroupsList));
        assert_eq!(parse("groups list"), Ok(ConsoleCommand::GroupsList));
        assert_eq!(parse("groups showall"), Ok(ConsoleCommand::GroupsShowAll));
        assert_eq!(
            parse("groups hide deep work"),
            Ok(ConsoleCommand::GroupHide("deep work".to_string()))
        );
        assert_eq!(
            parse("groups show home"),
            Ok(ConsoleCommand::GroupShow("home".to_string()))
        );
        assert_eq!(
            parse("groups toggle home"),
            Ok(ConsoleCommand::GroupToggle("home".to_string()))
        );

        let usage = "Usage: groups list | groups hide <name> | groups show <name> | groups toggle <name> | groups showall";
        assert_eq!(parse("groups hide"), Err(usage.to_string()));
        assert_eq!(parse("groups explode home"), Err(usage.to_string()));
    }

    #[test]
    fn test_og_subcommands() {
        assert_eq!(parse("og record"), Ok(ConsoleCommand::OgRecord));
        assert_eq!(parse("og save"), Ok(ConsoleCommand::OgSave));
        assert_eq!(parse("og load"), Ok(ConsoleCommand::OgLoad));
        assert_eq!(parse("og"), Err("Usage: og record | og save | og load".to_string()));
        assert_eq!(
            parse("og apply"),
            Err("Usage: og record | og save | og load".to_string())
        );
    }

    #[test]
    fn test_camera_subcommands() {
        assert_eq!(parse("camera capture"), Ok(ConsoleCommand::CameraCapture(None)));
        assert_eq!(
            parse("camera capture front left"),
            Ok(ConsoleCommand::CameraCapture(Some("front left".to_string())))
        );
        assert_eq!(parse("camera list"), Ok(ConsoleCommand::CameraList));
        assert_eq!(
            parse("camera load front"),
            Ok(ConsoleCommand::CameraLoad("front".to_string()))
        );
        assert_eq!(
            parse("camera load"),
            Err("Usage: camera load <name>".to_string())
        );
        assert_eq!(
            parse("camera delete front"),
            Ok(ConsoleCommand::CameraDelete("front".to_string()))
        );
        assert_eq!(
            parse("camera delete"),
            Err("Usage: camera delete <name>".to_string())
        );
        assert_eq!(parse("camera save"), Ok(ConsoleCommand::CameraSave));
        assert_eq!(parse("camera sync"), Ok(ConsoleCommand::CameraSync));
        assert!(parse("camera").is_err());
        assert!(parse("camera warp").is_err());
    }

    #[test]
    fn test_toggle_panels() {
        assert_eq!(
            parse("toggle add-node"),
            Ok(ConsoleCommand::TogglePanel(Panel::AddNode))
        );
        assert_eq!(
            parse("toggle delete-node"),
            Ok(ConsoleCommand::TogglePanel(Panel::DeleteNode))
        );
        assert_eq!(
            parse("toggle add-link"),
            Ok(ConsoleCommand::TogglePanel(Panel::AddLink))
        );
        assert_eq!(
            parse("toggle controls"),
            Ok(ConsoleCommand::TogglePanel(Panel::Controls))
        );
        assert_eq!(
            parse("toggle editor"),
            Err("Unknown panel. Use: add-node, delete-node, add-link, controls.".to_string())
        );
    }

    #[test]
    fn test_find_requires_query() {
        assert_eq!(
            parse("find graph theory"),
            Ok(ConsoleCommand::Find("graph theory".to_string()))
        );
        assert_eq!(parse("find"), Err("Usage: find <query>".to_string()));
    }

    #[test]
    fn test_unknown_command_names_the_action() {
        assert_eq!(
            parse("frobnicate now"),
            Err("Unknown command: frobnicate. Type help.".to_string())
        );
    }

    #[test]
    fn test_extra_whitespace_is_collapsed() {
        assert_eq!(
            parse("  groups   hide   deep   work  "),
            Ok(ConsoleCommand::GroupHide("deep work".to_string()))
        );
    }
}
