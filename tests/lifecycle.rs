//! Dialog lifecycle tests, driven through the headless session API

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use dialogbox::arbiter::{ControlSignal, Step, TerminationEvent};
use dialogbox::config::{ButtonSpec, DialogConfig, Mode, WaitPolicy};
use dialogbox::emission::should_print;
use dialogbox::modes::entry::EntryWidget;
use dialogbox::modes::file::FileWidget;
use dialogbox::modes::progress::ProgressWidget;
use dialogbox::modes::{ModeWidget, WidgetSignal};
use dialogbox::plug::{MemoryStore, PlugSlot, SlotTable};
use dialogbox::response::ResultCode;
use dialogbox::session::{DialogSession, LoopEvent};

fn entry_session(config: DialogConfig) -> DialogSession {
    let widget = EntryWidget::new(&config);
    DialogSession::new(Arc::new(config), Box::new(widget))
}

fn entry_config(text: &str) -> DialogConfig {
    let mut config = DialogConfig::new(Mode::Entry);
    config.options.entry.text = text.to_string();
    config
}

fn button(response: ResultCode) -> LoopEvent {
    LoopEvent::Termination(TerminationEvent::ButtonPressed { response, command: None })
}

#[test]
fn test_entry_ok_prints_text() {
    let mut session = entry_session(entry_config("hello world"));
    assert_eq!(session.dispatch(button(ResultCode::OK)), Step::Exit);

    let outcome = session.finish();
    assert_eq!(outcome.code, ResultCode::OK);
    assert_eq!(outcome.output.as_deref(), Some("hello world"));
}

#[test]
fn test_entry_cancel_prints_nothing() {
    let mut session = entry_session(entry_config("secret"));
    session.dispatch(button(ResultCode::CANCEL));

    let outcome = session.finish();
    assert_eq!(outcome.code, ResultCode::CANCEL);
    assert_eq!(outcome.output, None);
}

#[test]
fn test_progress_close_prints_nothing() {
    let config = DialogConfig::new(Mode::Progress);
    let widget = ProgressWidget::detached(&config);
    let mut session = DialogSession::new(Arc::new(config), Box::new(widget));

    assert_eq!(session.dispatch(button(ResultCode::OK)), Step::Exit);
    let outcome = session.finish();
    assert_eq!(outcome.code, ResultCode::OK);
    assert_eq!(outcome.output, None);
}

#[test]
fn test_timeout_expires_after_budget() {
    let mut config = entry_config("typed");
    config.termination.timeout = 3;
    config.termination.always_print = true;
    let mut session = entry_session(config);

    for _ in 0..3 {
        assert_eq!(session.dispatch(LoopEvent::Tick), Step::Continue);
    }
    assert_eq!(session.dispatch(LoopEvent::Tick), Step::Exit);

    let outcome = session.finish();
    assert_eq!(outcome.code, ResultCode::TIMEOUT);
    assert_eq!(outcome.output, None);
}

#[test]
fn test_indicator_drains_with_ticks() {
    let mut config = entry_config("");
    config.termination.timeout = 4;
    let mut session = entry_session(config);

    assert_eq!(session.indicator().map(|i| i.fraction), Some(1.0));
    session.dispatch(LoopEvent::Tick);
    session.dispatch(LoopEvent::Tick);
    let fraction = session.indicator().map(|i| i.fraction).unwrap();
    assert!(fraction < 1.0 && fraction > 0.0);
}

#[test]
fn test_first_trigger_wins() {
    let mut session = entry_session(entry_config("x"));
    assert_eq!(session.dispatch(button(ResultCode::CANCEL)), Step::Exit);

    assert_eq!(session.dispatch(button(ResultCode::OK)), Step::Continue);
    assert_eq!(
        session.dispatch(LoopEvent::Termination(TerminationEvent::TimeoutExpired)),
        Step::Continue
    );
    assert_eq!(
        session.dispatch(LoopEvent::Termination(TerminationEvent::SignalReceived(
            ControlSignal::Confirm
        ))),
        Step::Continue
    );
    assert_eq!(session.finish().code, ResultCode::CANCEL);
}

#[test]
fn test_escape_and_window_close() {
    let mut session = entry_session(entry_config("x"));
    session.dispatch(LoopEvent::Termination(TerminationEvent::KeyEscape));
    assert_eq!(session.finish().code, ResultCode::ESCAPE);

    let mut session = entry_session(entry_config("x"));
    assert_eq!(
        session.dispatch(LoopEvent::Termination(TerminationEvent::WindowClosed)),
        Step::Exit
    );
    let outcome = session.finish();
    assert_eq!(outcome.code, ResultCode::ESCAPE);
    assert_eq!(outcome.output, None);
}

#[test]
fn test_control_signals_standalone() {
    let mut config = entry_config("value");
    config.termination.default_response = ResultCode(2);
    let mut session = entry_session(config);
    session.dispatch(LoopEvent::Termination(TerminationEvent::SignalReceived(
        ControlSignal::Confirm,
    )));
    assert_eq!(session.finish().code, ResultCode(2));

    let mut session = entry_session(entry_config("value"));
    session.dispatch(LoopEvent::Termination(TerminationEvent::SignalReceived(
        ControlSignal::Cancel,
    )));
    assert_eq!(session.finish().code, ResultCode::CANCEL);
}

#[test]
fn test_control_signals_plugged() {
    let mut config = entry_config("value");
    config.embed.plug = Some(77);
    config.embed.tabnum = 1;
    let mut session = entry_session(config);

    assert_eq!(
        session.dispatch(LoopEvent::Termination(TerminationEvent::SignalReceived(
            ControlSignal::Confirm
        ))),
        Step::PrintNow
    );
    assert_eq!(session.current_output().as_deref(), Some("value"));
    assert!(!session.is_finished());

    assert_eq!(
        session.dispatch(LoopEvent::Termination(TerminationEvent::SignalReceived(
            ControlSignal::Cancel
        ))),
        Step::Exit
    );
    assert_eq!(session.finish().code, ResultCode::ESCAPE);
}

#[test]
fn test_button_with_command_keeps_running() {
    let mut session = entry_session(entry_config("x"));
    let step = session.dispatch(LoopEvent::Termination(TerminationEvent::ButtonPressed {
        response: ResultCode(4),
        command: Some("touch /tmp/never".into()),
    }));
    assert_eq!(step, Step::Launch("touch /tmp/never".into()));
    assert!(!session.is_finished());

    assert_eq!(session.apply(WidgetSignal::Launch("true".into())), Step::Launch("true".into()));
    assert!(!session.is_finished());
}

#[test]
fn test_custom_buttons_print_by_parity() {
    let mut config = entry_config("picked");
    config.buttons.buttons = vec![
        ButtonSpec::new("Keep", ResultCode(2)),
        ButtonSpec::new("Drop", ResultCode(3)),
    ];

    let mut session = entry_session(config.clone());
    session.dispatch(button(ResultCode(2)));
    assert_eq!(session.finish().output.as_deref(), Some("picked"));

    let mut session = entry_session(config.clone());
    session.dispatch(button(ResultCode(3)));
    assert_eq!(session.finish().output, None);

    config.termination.always_print = true;
    let mut session = entry_session(config);
    session.dispatch(button(ResultCode(3)));
    assert_eq!(session.finish().output.as_deref(), Some("picked"));
}

#[test]
fn test_emission_gate_matrix() {
    for code in [0, 1, 2, 3, 4, 252, 253, -2] {
        let code = ResultCode(code);
        assert_eq!(should_print(code, false, false), code == ResultCode::OK, "{code}");
        assert_eq!(should_print(code, false, true), code.is_affirmative(), "{code}");
        assert_eq!(should_print(code, true, true), !code.is_sentinel(), "{code}");
    }
}

#[test]
fn test_save_overwrite_veto() {
    let dir = tempfile::tempdir().unwrap();
    let target = dir.path().join("report.txt");
    std::fs::write(&target, "old").unwrap();

    let mut config = DialogConfig::new(Mode::File);
    config.options.file.filename = Some(target.clone());
    config.options.file.save = true;
    config.options.file.confirm_overwrite = true;
    let widget = FileWidget::new(&config);
    let mut session = DialogSession::new(Arc::new(config), Box::new(widget));

    assert_eq!(session.dispatch(button(ResultCode::OK)), Step::ConfirmOverwrite(ResultCode::OK));
    assert!(session.awaiting_confirmation());

    assert_eq!(session.resolve_overwrite(false), Step::Continue);
    assert!(!session.is_finished());

    // declined once, asked again on the next attempt
    assert_eq!(session.dispatch(button(ResultCode::OK)), Step::ConfirmOverwrite(ResultCode::OK));
    assert_eq!(session.resolve_overwrite(true), Step::Exit);

    let outcome = session.finish();
    assert_eq!(outcome.code, ResultCode::OK);
    assert_eq!(outcome.output, Some(target.display().to_string()));
}

#[test]
fn test_escape_during_overwrite_prompt() {
    let dir = tempfile::tempdir().unwrap();
    let target = dir.path().join("notes.txt");
    std::fs::write(&target, "old").unwrap();

    let mut config = DialogConfig::new(Mode::File);
    config.options.file.filename = Some(target);
    config.options.file.save = true;
    config.options.file.confirm_overwrite = true;
    let widget = FileWidget::new(&config);
    let mut session = DialogSession::new(Arc::new(config), Box::new(widget));

    assert_eq!(session.dispatch(button(ResultCode::OK)), Step::ConfirmOverwrite(ResultCode::OK));
    assert_eq!(
        session.dispatch(LoopEvent::Termination(TerminationEvent::KeyEscape)),
        Step::Continue
    );
    assert!(!session.awaiting_confirmation());
    assert!(!session.is_finished());

    assert_eq!(session.dispatch(button(ResultCode::OK)), Step::ConfirmOverwrite(ResultCode::OK));
}

#[test]
fn test_progress_input_read_while_hidden() {
    let mut config = DialogConfig::new(Mode::Progress);
    config.options.progress.auto_close = true;
    let (tx, rx) = std::sync::mpsc::channel();
    let widget = ProgressWidget::detached(&config).with_input(rx);
    let mut session = DialogSession::new(Arc::new(config), Box::new(widget));

    tx.send("30".to_string()).unwrap();
    tx.send("100".to_string()).unwrap();
    // nothing draws the widget, polling alone has to reach the end
    let signal = session.widget_mut().poll();
    assert_eq!(session.apply(signal), Step::Exit);

    let outcome = session.finish();
    assert_eq!(outcome.code, ResultCode::OK);
    assert_eq!(outcome.output, None);
}

#[test]
fn test_save_new_file_needs_no_confirmation() {
    let dir = tempfile::tempdir().unwrap();

    let mut config = DialogConfig::new(Mode::File);
    config.options.file.filename = Some(dir.path().join("fresh.txt"));
    config.options.file.save = true;
    config.options.file.confirm_overwrite = true;
    let widget = FileWidget::new(&config);
    let mut session = DialogSession::new(Arc::new(config), Box::new(widget));

    assert_eq!(session.dispatch(button(ResultCode::OK)), Step::Exit);
}

#[test]
fn test_plug_handshake() {
    let store = Arc::new(MemoryStore::new(4));
    let policy = WaitPolicy::Bounded(Duration::from_secs(5));

    // children start before the container has written its header
    let children: Vec<_> = (1..=2)
        .map(|tabnum| {
            let store = Arc::clone(&store);
            thread::spawn(move || {
                let slot = PlugSlot::new(store, tabnum, policy).unwrap();
                assert_eq!(slot.container_pid(), 1000);
                slot.publish(2000 + tabnum as i32, 0x100 + tabnum as u64);
            })
        })
        .collect();

    thread::sleep(Duration::from_millis(20));
    let table = SlotTable::new(Arc::clone(&store), 2, 1000).unwrap();
    let slots = table.wait_children(policy).unwrap();
    for child in children {
        child.join().unwrap();
    }

    assert_eq!(slots.len(), 2);
    assert_eq!((slots[0].pid, slots[0].handle), (2001, 0x101));
    assert_eq!((slots[1].pid, slots[1].handle), (2002, 0x102));
}

#[test]
fn test_plug_handshake_times_out() {
    let store = Arc::new(MemoryStore::new(3));
    let table = SlotTable::new(Arc::clone(&store), 2, 1000).unwrap();
    let err = table
        .wait_children(WaitPolicy::Bounded(Duration::from_millis(10)))
        .unwrap_err();
    assert!(matches!(err, dialogbox::DialogError::HandshakeTimeout { .. }));
}

#[test]
fn test_widget_result_survives_session() {
    let config = entry_config("kept");
    let widget: Box<dyn ModeWidget> = Box::new(EntryWidget::new(&config));
    let mut session = DialogSession::new(Arc::new(config), widget);
    assert_eq!(session.apply(WidgetSignal::Activate), Step::Exit);
    assert_eq!(session.finish().output.as_deref(), Some("kept"));
}
