//! Package, upload, clean up

use crate::service::FunctionService;
use lambdapack_core::{
    create_function_package, ArchiveGuard, CreatedFunction, FunctionSettings, InstallError,
};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Everything one deployment needs
#[derive(Debug, Clone)]
pub struct DeployPlan {
    pub settings: FunctionSettings,
    pub binary: PathBuf,
    pub bootstrap: PathBuf,
    /// Directory the transient archive is written to
    pub work_dir: PathBuf,
    /// Delete an existing function of the same name first
    pub delete: bool,
}

impl DeployPlan {
    /// `<work_dir>/<function name>.zip`
    pub fn archive_path(&self) -> PathBuf {
        self.work_dir.join(format!("{}.zip", self.settings.function_name))
    }
}

/// Upload a packaged archive as a new function.
///
/// With `delete`, an existing function of the same name is deleted first.
/// Any failure of that delete is ignored and creation is attempted anyway.
/// Creation errors are returned as-is.
pub async fn install_lambda_package<S>(
    service: &S,
    package_path: &Path,
    settings: &FunctionSettings,
    delete: bool,
) -> Result<CreatedFunction, InstallError>
where
    S: FunctionService + ?Sized,
{
    let code = tokio::fs::read(package_path)
        .await
        .map_err(|source| InstallError::ReadPackage {
            path: package_path.to_path_buf(),
            source,
        })?;

    if delete {
        match service.delete_function(&settings.function_name).await {
            Ok(()) => info!("Deleted function '{}'.", settings.function_name),
            Err(e) => debug!(error = %e, "Pre-delete failed, creating anyway"),
        }
    }

    info!(
        function_name = %settings.function_name,
        code_size = code.len(),
        "Installing lambda function"
    );

    service.create_function(settings, code).await
}

/// Build the archive, install it, and remove the archive whatever the outcome.
pub async fn deploy<S>(service: &S, plan: &DeployPlan) -> Result<CreatedFunction, InstallError>
where
    S: FunctionService + ?Sized,
{
    let archive = ArchiveGuard::new(plan.archive_path());

    let summary = create_function_package(archive.path(), &plan.binary, &plan.bootstrap)?;
    info!(
        path = %summary.path.display(),
        size = summary.size,
        sha256 = %summary.sha256,
        "Created function package"
    );

    let created =
        install_lambda_package(service, archive.path(), &plan.settings, plan.delete).await?;

    if let Some(remote) = created.code_sha256.as_deref() {
        if remote != summary.sha256 {
            warn!(
                local = %summary.sha256,
                remote,
                "Deployed code hash differs from the local package"
            );
        }
    }

    Ok(created)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use lambdapack_core::package_entries;
    use std::sync::Mutex;

    #[derive(Debug, Clone, PartialEq, Eq)]
    enum Call {
        Delete(String),
        Create(String),
    }

    /// Records calls and can be told to fail either operation
    #[derive(Default)]
    struct RecordingService {
        calls: Mutex<Vec<Call>>,
        fail_delete: bool,
        fail_create: bool,
        /// Archive path whose existence is checked during create
        watch: Option<PathBuf>,
        archive_seen: Mutex<Option<bool>>,
        uploaded: Mutex<Vec<u8>>,
    }

    impl RecordingService {
        fn calls(&self) -> Vec<Call> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl FunctionService for RecordingService {
        async fn delete_function(&self, function_name: &str) -> Result<(), InstallError> {
            self.calls
                .lock()
                .unwrap()
                .push(Call::Delete(function_name.to_string()));
            if self.fail_delete {
                return Err(InstallError::delete(function_name, "ResourceNotFoundException"));
            }
            Ok(())
        }

        async fn create_function(
            &self,
            settings: &FunctionSettings,
            code: Vec<u8>,
        ) -> Result<CreatedFunction, InstallError> {
            self.calls
                .lock()
                .unwrap()
                .push(Call::Create(settings.function_name.clone()));
            if let Some(watch) = &self.watch {
                *self.archive_seen.lock().unwrap() = Some(watch.exists());
            }
            *self.uploaded.lock().unwrap() = code;
            if self.fail_create {
                return Err(InstallError::create(&settings.function_name, "AccessDeniedException"));
            }
            Ok(CreatedFunction {
                function_name: settings.function_name.clone(),
                function_arn: format!(
                    "arn:aws:lambda:us-east-1:000000000000:function:{}",
                    settings.function_name
                ),
                code_sha256: None,
            })
        }
    }

    struct Fixture {
        dir: tempfile::TempDir,
        plan: DeployPlan,
    }

    fn fixture(name: &str, delete: bool) -> Fixture {
        let dir = tempfile::tempdir().unwrap();
        let binary = dir.path().join("tool");
        let bootstrap = dir.path().join("lambdapack-bootstrap");
        std::fs::write(&binary, b"tool").unwrap();
        std::fs::write(&bootstrap, b"bootstrap").unwrap();

        let plan = DeployPlan {
            settings: FunctionSettings::new(name, "arn:aws:iam::000000000000:role/exec"),
            binary,
            bootstrap,
            work_dir: dir.path().to_path_buf(),
            delete,
        };
        Fixture { dir, plan }
    }

    #[test]
    fn test_archive_path_uses_function_name() {
        let fx = fixture("foo", false);
        assert_eq!(fx.plan.archive_path(), fx.dir.path().join("foo.zip"));
    }

    #[tokio::test]
    async fn test_deploy_uploads_and_removes_archive() {
        let fx = fixture("foo", false);
        let service = RecordingService {
            watch: Some(fx.plan.archive_path()),
            ..Default::default()
        };

        let created = deploy(&service, &fx.plan).await.unwrap();

        assert_eq!(created.function_arn, "arn:aws:lambda:us-east-1:000000000000:function:foo");
        assert_eq!(service.calls(), vec![Call::Create("foo".to_string())]);
        assert_eq!(*service.archive_seen.lock().unwrap(), Some(true));
        assert!(!fx.plan.archive_path().exists());

        // The uploaded bytes are the two-entry archive
        let copy = fx.dir.path().join("uploaded.zip");
        std::fs::write(&copy, &*service.uploaded.lock().unwrap()).unwrap();
        assert_eq!(package_entries(&copy).unwrap(), vec!["binary", "bootstrap"]);
    }

    #[tokio::test]
    async fn test_deploy_removes_archive_when_create_fails() {
        let fx = fixture("foo", false);
        let service = RecordingService {
            fail_create: true,
            watch: Some(fx.plan.archive_path()),
            ..Default::default()
        };

        let err = deploy(&service, &fx.plan).await.unwrap_err();

        assert!(matches!(err, InstallError::Create { .. }));
        assert_eq!(*service.archive_seen.lock().unwrap(), Some(true));
        assert!(!fx.plan.archive_path().exists());
    }

    #[tokio::test]
    async fn test_delete_failure_is_swallowed() {
        let fx = fixture("foo", true);
        let service = RecordingService {
            fail_delete: true,
            ..Default::default()
        };

        let created = deploy(&service, &fx.plan).await.unwrap();

        assert_eq!(created.function_name, "foo");
        assert_eq!(
            service.calls(),
            vec![Call::Delete("foo".to_string()), Call::Create("foo".to_string())]
        );
    }

    #[tokio::test]
    async fn test_no_delete_without_flag() {
        let fx = fixture("foo", false);
        let service = RecordingService::default();

        deploy(&service, &fx.plan).await.unwrap();

        assert!(!service
            .calls()
            .iter()
            .any(|call| matches!(call, Call::Delete(_))));
    }

    #[tokio::test]
    async fn test_packaging_failure_skips_service() {
        let mut fx = fixture("foo", true);
        fx.plan.binary = fx.dir.path().join("missing");
        let service = RecordingService::default();

        let err = deploy(&service, &fx.plan).await.unwrap_err();

        assert!(matches!(err, InstallError::Package(_)));
        assert!(service.calls().is_empty());
        assert!(!fx.plan.archive_path().exists());
    }

    #[tokio::test]
    async fn test_install_reports_unreadable_package() {
        let dir = tempfile::tempdir().unwrap();
        let settings = FunctionSettings::new("foo", "role");
        let service = RecordingService::default();

        let err = install_lambda_package(&service, &dir.path().join("foo.zip"), &settings, true)
            .await
            .unwrap_err();

        assert!(matches!(err, InstallError::ReadPackage { .. }));
        assert!(service.calls().is_empty());
    }
}
