use std::path::Path;

/// Validate file path exists and is readable
pub fn validate_file_path(path: &str) -> Result<(), String> {
    let path_obj = Path::new(path);

    if !path_obj.exists() {
        return Err(format!("File does not exist: {}", path));
    }

    if !path_obj.is_file() {
        return Err(format!("Path is not a file: {}", path));
    }

    if !path_obj.metadata().map(|m| m.is_file()).unwrap_or(false) {
        return Err(format!("Cannot read file: {}", path));
    }

    Ok(())
}

/// Validate every merge input; at least one is required.
pub fn validate_inputs(inputs: &[String]) -> Result<(), String> {
    if inputs.is_empty() {
        return Err("At least one input file is required.".to_string());
    }
    inputs.iter().try_for_each(|input| validate_file_path(input))
}

/// Validate the output path: refuse to overwrite an existing file or one of
/// the inputs unless `force`, and create the parent directory when it is
/// missing. Inputs are fully read before the output is written.
pub fn validate_output_path(path: &str, force: bool, inputs: &[String]) -> Result<(), String> {
    let path_obj = Path::new(path);

    if path_obj.is_dir() {
        return Err(format!("Output path is a directory: {}", path));
    }

    if path_obj.exists() && !force {
        return Err(format!(
            "Output file already exists: {} (use --force to overwrite)",
            path
        ));
    }

    if !force && inputs.iter().any(|input| same_file(input, path)) {
        return Err(format!(
            "Output file is also an input: {} (use --force to overwrite)",
            path
        ));
    }

    if let Some(parent) = path_obj.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            // Try to create the directory
            if let Err(e) = std::fs::create_dir_all(parent) {
                return Err(format!("Cannot create output directory: {}", e));
            }
        }
    }

    Ok(())
}

fn same_file(a: &str, b: &str) -> bool {
    match (Path::new(a).canonicalize(), Path::new(b).canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_validate_file_path() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("app-de.ts");
        fs::write(&file, "<TS/>").unwrap();

        assert!(validate_file_path(file.to_str().unwrap()).is_ok());
        assert!(
            validate_file_path(dir.path().to_str().unwrap())
                .unwrap_err()
                .contains("not a file")
        );
        assert!(
            validate_file_path("definitely-missing.ts")
                .unwrap_err()
                .contains("does not exist")
        );
    }

    #[test]
    fn test_validate_inputs_requires_one() {
        assert!(validate_inputs(&[]).unwrap_err().contains("At least one"));
    }

    #[test]
    fn test_existing_output_requires_force() {
        let dir = tempdir().unwrap();
        let out = dir.path().join("merged-de.ts");
        fs::write(&out, "<TS/>").unwrap();
        let out = out.to_str().unwrap();

        assert!(validate_output_path(out, false, &[]).unwrap_err().contains("--force"));
        assert!(validate_output_path(out, true, &[]).is_ok());
    }

    #[test]
    fn test_output_may_be_an_input_only_with_force() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("app-de.ts");
        fs::write(&file, "<TS/>").unwrap();
        let file = file.to_str().unwrap().to_string();
        let inputs = std::slice::from_ref(&file);

        let err = validate_output_path(&file, false, inputs).unwrap_err();
        assert!(err.contains("--force"));
        assert!(validate_output_path(&file, true, inputs).is_ok());
    }

    #[test]
    fn test_same_file_sees_through_path_spelling() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("app-de.ts");
        fs::write(&input, "<TS/>").unwrap();
        // Same file reached through a different spelling.
        let spelled = dir.path().join(".").join("app-de.ts");
        let inputs = vec![input.to_str().unwrap().to_string()];

        assert!(!same_file(&inputs[0], "missing-de.ts"));
        assert!(same_file(&inputs[0], spelled.to_str().unwrap()));
    }

    #[test]
    fn test_output_parent_is_created() {
        let dir = tempdir().unwrap();
        let out = dir.path().join("out").join("merged-de.ts");
        assert!(validate_output_path(out.to_str().unwrap(), false, &[]).is_ok());
        assert!(dir.path().join("out").is_dir());
    }
}
