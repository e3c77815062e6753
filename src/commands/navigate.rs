use crate::core::{
    channel::StateChannel,
    error::Result,
    git::GitRepo,
    navigate::Navigator,
    print_success, print_warning,
    state::NavigationState,
    VersionControl,
};

/// Navigator over the repository containing the current directory.
pub fn open_navigator() -> Result<Navigator<GitRepo>> {
    Navigator::open(GitRepo::open_current()?)
}

/// Resolve the current position and share it with output processes.
pub fn publish_state<B: VersionControl>(nav: &mut Navigator<B>) -> Result<NavigationState> {
    let state = nav.state()?;
    let root = nav.backend().root_dir()?;
    StateChannel::for_course(&root).publish(&state)?;
    Ok(state)
}

pub fn describe_location<B: VersionControl>(
    nav: &mut Navigator<B>,
    state: &NavigationState,
) -> Result<String> {
    let course = nav.context().graph()?;
    Ok(state.title(course))
}

/// Publish and report the outcome of a move.
pub fn report_move<B: VersionControl>(
    nav: &mut Navigator<B>,
    moved: bool,
    refused: &str,
) -> Result<()> {
    let state = publish_state(nav)?;

    if moved {
        print_success(&format!("Now at {}", describe_location(nav, &state)?));
    } else if let Some(failure) = nav.last_failure() {
        print_warning(&failure.to_string());
    } else {
        print_warning(refused);
    }
    Ok(())
}

pub fn execute_module(module: &str) -> Result<()> {
    let mut nav = open_navigator()?;
    let moved = nav.set_module(module)?;
    report_move(&mut nav, moved, "Could not enter the module")
}

pub fn execute_chapter(module: &str, chapter: &str) -> Result<()> {
    let mut nav = open_navigator()?;
    let moved = nav.set_chapter(module, chapter)?;
    report_move(&mut nav, moved, "Could not enter the chapter")
}

pub fn execute_next() -> Result<()> {
    let mut nav = open_navigator()?;
    let moved = nav.next_step()?;
    report_move(&mut nav, moved, "Already at the last step")
}

pub fn execute_prev() -> Result<()> {
    let mut nav = open_navigator()?;
    let moved = nav.prev_step()?;
    report_move(&mut nav, moved, "Already at the first step")
}

pub fn execute_goto(reference: &str) -> Result<()> {
    let mut nav = open_navigator()?;
    let moved = nav.go_to(reference)?;
    report_move(&mut nav, moved, "Could not move")
}

/// Mark a chapter completed; the current one when no target is given.
pub fn execute_complete(target: Option<(String, String)>) -> Result<()> {
    let mut nav = open_navigator()?;
    nav.complete(
        target
            .as_ref()
            .map(|(module, chapter)| (module.as_str(), chapter.as_str())),
    )?;
    print_success("Chapter marked as completed");
    Ok(())
}
