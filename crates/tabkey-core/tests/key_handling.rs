//! End-to-end keypress behaviour through the plugin and the keymap.

use std::cell::Cell;
use std::rc::Rc;

use pretty_assertions::assert_eq;
use tabkey_config::{Hotkey, Key, Settings};
use tabkey_core::collab::{OUTLINER_INDENT_COMMAND, TABLE_NEXT_CELL_COMMAND};
use tabkey_core::{EditAction, EditingMode, Keymap, TabKeyPlugin, TextView};
use tabkey_test_utils::config::TestConfigBuilder;
use tabkey_test_utils::host::ScriptedHost;

fn tab(settings: Settings, host: &mut ScriptedHost) -> bool {
    TabKeyPlugin::new(settings).handle_tab(host)
}

fn outliner_that_indents(host: ScriptedHost) -> ScriptedHost {
    host.on_command(OUTLINER_INDENT_COMMAND, |host| {
        host.view_mut().perform(EditAction::IndentMore);
        true
    })
}

// ── Indentation ──────────────────────────────────────────────────

#[test_log::test]
fn test_tab_character_advances_cursor_by_one() {
    for (before, after) in [
        ("<|>", "\t<|>"),
        ("ab<|>cd", "ab\t<|>cd"),
        ("text<|>", "text\t<|>"),
        ("é😀<|>x", "é😀\t<|>x"),
    ] {
        let mut host = ScriptedHost::marked(before);
        assert!(tab(Settings::default(), &mut host));
        assert_eq!(host.marked_text(), after);
    }
}

#[test_log::test]
fn test_aligned_spaces_reach_next_stop() {
    let settings = || TestConfigBuilder::new().spaces(4, true).settings();

    let mut host = ScriptedHost::marked("abc<|>");
    assert!(tab(settings(), &mut host));
    assert_eq!(host.marked_text(), "abc <|>");

    let mut host = ScriptedHost::marked("abcde<|>");
    assert!(tab(settings(), &mut host));
    assert_eq!(host.marked_text(), "abcde   <|>");
}

#[test]
fn test_unaligned_spaces_are_fixed_width() {
    let settings = TestConfigBuilder::new().spaces(3, false).settings();
    let mut host = ScriptedHost::marked("abcde<|>");
    assert!(tab(settings, &mut host));
    assert_eq!(host.marked_text(), "abcde   <|>");
}

#[test]
fn test_hard_spaces() {
    let settings = TestConfigBuilder::new()
        .spaces(2, true)
        .hard_spaces(true)
        .settings();
    let mut host = ScriptedHost::marked("a<|>");
    assert!(tab(settings, &mut host));
    assert_eq!(host.marked_text(), "a\u{a0}<|>");
}

#[test]
fn test_single_line_selection_is_replaced() {
    let mut host = ScriptedHost::marked("keep <a>this<|> text");
    assert!(tab(Settings::default(), &mut host));
    assert_eq!(host.marked_text(), "keep \t<|> text");
}

#[test_log::test]
fn test_selection_over_lines_two_to_four_is_indented() {
    let mut host = ScriptedHost::marked("zero\none\nt<a>wo\nthree\nfo<|>ur\nfive");
    assert!(tab(Settings::default(), &mut host));
    assert_eq!(
        host.marked_text(),
        "zero\none\n\tt<a>wo\n\tthree\n\tfo<|>ur\nfive"
    );
}

#[test]
fn test_selection_indent_disabled_replaces_selection() {
    let settings = TestConfigBuilder::new().selection(false, true).settings();
    let mut host = ScriptedHost::marked("a<a>b\nc<|>d");
    assert!(tab(settings, &mut host));
    assert_eq!(host.marked_text(), "a\t<|>d");
}

// ── Exception rule ───────────────────────────────────────────────

#[test_log::test]
fn test_empty_bullet_is_indented_not_spaced() {
    for settings in [
        Settings::default(),
        TestConfigBuilder::new().spaces(4, true).settings(),
    ] {
        let mut host = ScriptedHost::marked("- <|>");
        assert!(tab(settings, &mut host));
        assert_eq!(host.marked_text(), "\t- <|>");
    }
}

#[test]
fn test_empty_task_item_is_indented() {
    let mut host = ScriptedHost::marked("text\n  1. [ ] <|>");
    assert!(tab(Settings::default(), &mut host));
    assert_eq!(host.marked_text(), "text\n\t  1. [ ] <|>");
}

#[test]
fn test_custom_exception_regex() {
    let settings = TestConfigBuilder::new()
        .exception(true, r"^>\s*$")
        .settings();
    let mut host = ScriptedHost::marked("> <|>");
    assert!(tab(settings, &mut host));
    assert_eq!(host.marked_text(), "\t> <|>");
}

#[test]
fn test_broken_exception_regex_never_matches() {
    let settings = TestConfigBuilder::new().exception(true, "(").settings();
    let mut host = ScriptedHost::marked("- <|>");
    assert!(tab(settings, &mut host));
    assert_eq!(host.marked_text(), "- \t<|>");
}

// ── Zones ────────────────────────────────────────────────────────

#[test]
fn test_inactive_zone_leaves_key_to_host() {
    let cases = [
        (TestConfigBuilder::new().code_blocks(false), "```\nfn<|>\n```"),
        (TestConfigBuilder::new().inline_code(false), "run `l<|>s` now"),
        (TestConfigBuilder::new().lists(false), "- item<|>"),
        (TestConfigBuilder::new().others(false), "plain<|>"),
        (TestConfigBuilder::new(), "| a<|> | b |"),
    ];
    for (builder, text) in cases {
        let mut host = ScriptedHost::marked(text);
        assert!(!tab(builder.settings(), &mut host), "{text:?}");
        assert_eq!(host.marked_text(), text);
        assert!(host.invoked().is_empty());
    }
}

#[test]
fn test_inline_code_beats_list_zone() {
    let settings = TestConfigBuilder::new().lists(false).settings();
    let mut host = ScriptedHost::marked("- `a<|>b`");
    assert!(tab(settings, &mut host));
    assert_eq!(host.marked_text(), "- `a\t<|>b`");
}

#[test]
fn test_active_table_zone_skips_table_collaborators() {
    let settings = TestConfigBuilder::new().tables(true).settings();
    let mut host = ScriptedHost::marked("| a<|> | b |").with_noop_command(TABLE_NEXT_CELL_COMMAND);
    assert!(tab(settings, &mut host));
    assert_eq!(host.marked_text(), "| a\t<|> | b |");
    assert!(host.invoked().is_empty());
}

#[test]
fn test_no_view_is_not_consumed() {
    let mut host = ScriptedHost::without_view();
    assert!(!tab(Settings::default(), &mut host));
}

// ── Delegation ───────────────────────────────────────────────────

#[test_log::test]
fn test_outliner_change_consumes_without_local_insert() {
    let mut host = outliner_that_indents(ScriptedHost::marked("- a\n- b<|>"));
    assert!(tab(Settings::default(), &mut host));
    assert_eq!(host.marked_text(), "- a\n\t- b<|>");
    assert_eq!(host.invoked(), &[OUTLINER_INDENT_COMMAND]);
}

#[test]
fn test_outliner_no_op_falls_through() {
    let mut host = ScriptedHost::marked("- a\n- b<|>").with_noop_command(OUTLINER_INDENT_COMMAND);
    assert!(tab(Settings::default(), &mut host));
    assert_eq!(host.marked_text(), "- a\n- b\t<|>");
    assert_eq!(host.invoked(), &[OUTLINER_INDENT_COMMAND]);
}

#[test]
fn test_missing_outliner_falls_through() {
    let mut host = ScriptedHost::marked("1. item<|>");
    assert!(tab(Settings::default(), &mut host));
    assert_eq!(host.marked_text(), "1. item\t<|>");
}

#[test]
fn test_outliner_disabled_is_not_invoked() {
    let settings = TestConfigBuilder::new().outliner(false).settings();
    let mut host = outliner_that_indents(ScriptedHost::marked("- a\n- b<|>"));
    assert!(tab(settings, &mut host));
    assert!(host.invoked().is_empty());
    assert_eq!(host.marked_text(), "- a\n- b\t<|>");
}

#[test_log::test]
fn test_reentrant_tab_during_delegation_is_deferred() {
    let plugin = Rc::new(TabKeyPlugin::new(Settings::default()));
    let nested = Rc::new(Cell::new(None));

    let mut host = {
        let plugin = Rc::clone(&plugin);
        let nested = Rc::clone(&nested);
        ScriptedHost::marked("- a\n- b<|>").on_command(OUTLINER_INDENT_COMMAND, move |host| {
            nested.set(Some(plugin.handle_tab(host)));
            host.view_mut().perform(EditAction::IndentMore);
            true
        })
    };

    assert!(plugin.handle_tab(&mut host));
    assert_eq!(nested.get(), Some(false));
    assert_eq!(host.marked_text(), "- a\n\t- b<|>");
    assert!(!plugin.is_delegating());

    // the flag is clear again, so the next keypress delegates normally
    assert!(plugin.handle_tab(&mut host));
    assert_eq!(nested.get(), Some(false));
    assert_eq!(host.invoked().len(), 2);
}

#[test]
fn test_table_row_in_source_mode_moves_to_next_cell() {
    // inline code keeps the zone active while the line is a table row
    let mut host = ScriptedHost::marked("| `a<|>` | b |").with_noop_command(TABLE_NEXT_CELL_COMMAND);
    assert!(tab(Settings::default(), &mut host));
    assert_eq!(host.invoked(), &[TABLE_NEXT_CELL_COMMAND]);
    assert_eq!(host.marked_text(), "| `a<|>` | b |");
}

#[test]
fn test_table_row_in_live_preview_defers_to_native_editor() {
    let mut host = ScriptedHost::new(
        tabkey_core::MemoryView::from_marked("| `a<|>` | b |").with_mode(EditingMode::LivePreview),
    );
    assert!(!tab(Settings::default(), &mut host));
    assert!(host.invoked().is_empty());
    assert_eq!(host.marked_text(), "| `a<|>` | b |");
}

#[test]
fn test_table_collaborators_disabled_fall_through() {
    let settings = TestConfigBuilder::new()
        .table_collaborators(false, false)
        .settings();
    let mut host = ScriptedHost::marked("| `a<|>` | b |");
    assert!(tab(settings, &mut host));
    assert_eq!(host.marked_text(), "| `a\t<|>` | b |");
}

// ── Enter ────────────────────────────────────────────────────────

fn enter(settings: Settings, host: &mut ScriptedHost) -> bool {
    TabKeyPlugin::new(settings).handle_enter(host)
}

#[test_log::test]
fn test_enter_between_braces_expands_pair() {
    let mut host = ScriptedHost::marked("{<|>}");
    assert!(enter(Settings::default(), &mut host));
    assert_eq!(host.marked_text(), "{\n\t<|>\n}");
}

#[test]
fn test_enter_keeps_indent_of_opener_line() {
    let mut host = ScriptedHost::marked("  - f(<|>)");
    assert!(enter(Settings::default(), &mut host));
    assert_eq!(host.marked_text(), "  - f(\n\t  <|>\n  )");
}

#[test]
fn test_enter_leaves_following_lines_intact() {
    let mut host = ScriptedHost::marked("{<|>} \nafter");
    assert!(enter(Settings::default(), &mut host));
    assert_eq!(host.marked_text(), "{\n\t<|>\n} \nafter");

    let mut host = ScriptedHost::marked("f({<|>});\nafter");
    assert!(enter(Settings::default(), &mut host));
    assert_eq!(host.marked_text(), "f({\n\t<|>\n});\nafter");

    let mut host = ScriptedHost::marked("[<|>]\n\nafter");
    assert!(enter(Settings::default(), &mut host));
    assert_eq!(host.marked_text(), "[\n\t<|>\n]\n\nafter");
}

#[test]
fn test_enter_uses_code_pairs_in_code_block() {
    let mut host = ScriptedHost::marked("```html\n<div><|></div>\n```");
    assert!(enter(Settings::default(), &mut host));
    assert_eq!(host.marked_text(), "```html\n<div>\n\t<|>\n</div>\n```");

    let mut host = ScriptedHost::marked("<div><|></div>");
    assert!(!enter(Settings::default(), &mut host));
}

#[test]
fn test_enter_with_selection_is_not_consumed() {
    let mut host = ScriptedHost::marked("{<a>x<|>}");
    assert!(!enter(Settings::default(), &mut host));
    assert_eq!(host.marked_text(), "{<a>x<|>}");
}

#[test]
fn test_enter_custom_pairs_replace_defaults() {
    let settings = TestConfigBuilder::new()
        .text_pairs(&[(r"begin$", r"^end")])
        .settings();
    let mut host = ScriptedHost::marked("begin<|>end");
    assert!(enter(settings.clone(), &mut host));
    assert_eq!(host.marked_text(), "begin\n\t<|>\nend");

    let mut host = ScriptedHost::marked("{<|>}");
    assert!(!enter(settings, &mut host));
}

// ── Keymap ───────────────────────────────────────────────────────

#[test]
fn test_keymap_routes_configured_keys() {
    let plugin = Rc::new(TabKeyPlugin::new(
        TestConfigBuilder::new().spaces(2, true).settings(),
    ));
    let mut keymap = Keymap::new();
    plugin.register(&mut keymap);

    let mut host = ScriptedHost::marked("a<|>\n()");
    assert!(keymap.dispatch(&Hotkey::plain(Key::Tab), &mut host).is_consumed());
    assert_eq!(host.marked_text(), "a <|>\n()");

    host.view_mut().set_cursor(tabkey_core::Position::new(1, 1));
    assert!(keymap.dispatch(&Hotkey::plain(Key::Enter), &mut host).is_consumed());
    assert_eq!(host.marked_text(), "a \n(\n\t<|>\n)");

    let shift_tab: Hotkey = "Shift+Tab".parse().unwrap();
    assert!(!keymap.dispatch(&shift_tab, &mut host).is_consumed());
}

// ── Developer mode ───────────────────────────────────────────────

#[test]
fn test_developer_mode_traces_without_changing_behaviour() {
    tabkey_test_utils::tracing_setup::init_test_tracing();

    let quiet = TestConfigBuilder::new().settings();
    let traced = TestConfigBuilder::new().developer_mode(true).settings();
    assert!(traced.developer_mode);

    for (settings, text) in [(quiet, "- <|>"), (traced, "- <|>")] {
        let mut host = ScriptedHost::marked(text);
        assert!(tab(settings, &mut host));
        assert_eq!(host.marked_text(), "\t- <|>");
    }
}
