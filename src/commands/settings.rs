use crate::core::{
    error::Result, git::GitRepo, print_section_header, print_success, settings::CourseSettings,
};

/// Print one setting, or all of them when no key is given.
pub fn execute_settings_get(key: Option<&str>) -> Result<()> {
    let repo = GitRepo::open_current()?;
    let settings = CourseSettings::new(&repo);

    match key {
        Some(key) => println!("{}", settings.get(key)?),
        None => {
            print_section_header("Settings");
            for (key, value) in settings.all()? {
                println!("  {key} = {value}");
            }
            println!();
        }
    }

    Ok(())
}

pub fn execute_settings_set(key: &str, value: &str) -> Result<()> {
    let repo = GitRepo::open_current()?;
    CourseSettings::new(&repo).set(key, value)?;
    print_success(&format!("{key} = {value}"));
    Ok(())
}
