//! A host whose collaborator commands are scripted per test.
//!
//! ```ignore
//! let mut host = ScriptedHost::marked("- a\n- b<|>")
//!     .on_command(OUTLINER_INDENT_COMMAND, |host| {
//!         host.view_mut().perform(EditAction::IndentMore);
//!         true
//!     });
//! ```

use std::collections::HashMap;
use std::rc::Rc;

use tabkey_core::{Host, MemoryView, TextView};

/// Behaviour of one command id. Receives the host so it can edit the view
/// or dispatch keys re-entrantly.
pub type CommandScript = Rc<dyn Fn(&mut ScriptedHost) -> bool>;

#[derive(Default)]
pub struct ScriptedHost {
    view: Option<MemoryView>,
    commands: HashMap<String, CommandScript>,
    invoked: Vec<String>,
}

impl ScriptedHost {
    pub fn new(view: MemoryView) -> Self {
        Self {
            view: Some(view),
            ..Self::default()
        }
    }

    /// A host over [`MemoryView::from_marked`] text.
    pub fn marked(text: &str) -> Self {
        Self::new(MemoryView::from_marked(text))
    }

    pub fn without_view() -> Self {
        Self::default()
    }

    pub fn on_command(
        mut self,
        id: &str,
        script: impl Fn(&mut ScriptedHost) -> bool + 'static,
    ) -> Self {
        self.commands.insert(id.to_string(), Rc::new(script));
        self
    }

    /// A command that exists but leaves the buffer untouched.
    pub fn with_noop_command(self, id: &str) -> Self {
        self.on_command(id, |_| true)
    }

    pub fn view(&self) -> &MemoryView {
        self.view.as_ref().expect("host has no view")
    }

    pub fn view_mut(&mut self) -> &mut MemoryView {
        self.view.as_mut().expect("host has no view")
    }

    /// Every command id invoked so far, known or not.
    pub fn invoked(&self) -> &[String] {
        &self.invoked
    }

    /// The buffer with cursor marks, see [`MemoryView::to_marked`].
    pub fn marked_text(&self) -> String {
        self.view().to_marked()
    }
}

impl Host for ScriptedHost {
    fn active_text_view(&mut self) -> Option<&mut dyn TextView> {
        self.view.as_mut().map(|v| v as &mut dyn TextView)
    }

    fn invoke_command(&mut self, id: &str) -> bool {
        self.invoked.push(id.to_string());
        match self.commands.get(id).cloned() {
            Some(script) => script(self),
            None => false,
        }
    }
}
