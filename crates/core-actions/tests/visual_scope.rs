mod common;
use common::*;

use core_actions::{MotionFamily, RawCount, replay};
use core_model::EditorHost;
use core_state::{BufferId, Mode, VirtualEdit, VisualKind};
use pretty_assertions::assert_eq;

#[test]
fn chained_visual_motions_restore_exactly_once() {
    let mut adapter = adapter();
    let mut ed = editor_at(&["foo bar baz qux"], pos(1, 0));
    ed.toggle_visual(VisualKind::Char);
    adapter.pump(&mut ed);

    for _ in 0..3 {
        adapter
            .invoke(&mut ed, MotionFamily::Word, RawCount::Absent)
            .unwrap();
    }
    assert_eq!(ed.cursor(), pos(1, 12));
    assert_eq!(adapter.session(BufferId(1)).unwrap().hooks.len(), 1);
    assert_eq!(ed.virtual_edit_writes(), &[VirtualEdit::ONEMORE]);

    assert_eq!(adapter.pump(&mut ed), 1);
    assert_eq!(ed.virtual_edit(), VirtualEdit::empty());
    assert_eq!(
        ed.virtual_edit_writes(),
        &[VirtualEdit::ONEMORE, VirtualEdit::empty()]
    );
    assert_eq!(ed.selection(), Some((pos(1, 0), pos(1, 12))));
    assert_eq!(ed.mode(), Mode::Visual(VisualKind::Char));
}

#[test]
fn selection_may_extend_past_the_last_character() {
    for kind in ["v", "V", "<C-v>"] {
        let mut adapter = adapter();
        let mut ed = editor_at(&["foo", "bar"], pos(2, 0));
        replay::run(&mut adapter, &mut ed, &format!("{kind}w")).unwrap();
        // The live cursor is clamped once the user's value is back, the
        // trailing mark is not.
        assert_eq!(ed.cursor(), pos(2, 2), "{kind}");
        assert_eq!(ed.visual_end_mark(), Some(pos(2, 3)), "{kind}");
    }
}

#[test]
fn motion_continues_from_the_trailing_mark() {
    let mut adapter = adapter();
    let mut ed = editor_at(&["foo", "bar"], pos(2, 0));
    replay::run(&mut adapter, &mut ed, "vw").unwrap();
    // From the clamped cursor `ge` would reach `foo`; from the mark it ends
    // the selection on `bar`'s last character.
    replay::run(&mut adapter, &mut ed, "ge").unwrap();
    assert_eq!(ed.cursor(), pos(2, 2));
    assert_eq!(ed.visual_end_mark(), Some(pos(2, 2)));
    assert_eq!(ed.selection(), Some((pos(2, 0), pos(2, 2))));
}

#[test]
fn repeated_forward_motion_at_buffer_end_is_idempotent() {
    for family in ["w", "e", "W", "E"] {
        let mut adapter = adapter();
        let mut ed = editor_at(&["foo", "bar"], pos(2, 0));
        replay::run(&mut adapter, &mut ed, &format!("v{family}{family}")).unwrap();
        let mark = ed.visual_end_mark();
        let cursor = ed.cursor();
        for _ in 0..3 {
            replay::run(&mut adapter, &mut ed, family).unwrap();
            assert_eq!(ed.visual_end_mark(), mark, "{family}");
            assert_eq!(ed.cursor(), cursor, "{family}");
        }
        assert_eq!(ed.virtual_edit(), VirtualEdit::empty());
    }
}

#[test]
fn each_pumped_motion_restores_user_value() {
    let mut adapter = adapter();
    let mut ed = editor_at(&["foo bar"], pos(1, 0)).with_virtual_edit(VirtualEdit::ALL);
    replay::run(&mut adapter, &mut ed, "vee<Esc>").unwrap();
    assert_eq!(ed.mode(), Mode::Normal);
    assert_eq!(ed.cursor(), pos(1, 6));
    assert_eq!(ed.virtual_edit(), VirtualEdit::ALL);
    let widened = VirtualEdit::ALL | VirtualEdit::ONEMORE;
    assert_eq!(
        ed.virtual_edit_writes(),
        &[widened, VirtualEdit::ALL, widened, VirtualEdit::ALL]
    );
}
