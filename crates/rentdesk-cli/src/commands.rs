//! Command execution.
//!
//! Entity commands run the same way for every kind: through a
//! [`Resource`] and, when files are involved, through a media upload
//! coordinator whose settled value becomes the input's media list.

use std::sync::Arc;

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Value};

use rentdesk_api_client::{success_message, ApiClient, Operation, Resource};
use rentdesk_core::models::{
    Apartment, City, CreateApartmentInput, CreateCityInput, CreateNeighborhoodInput,
    CreateStateInput, CreateUnitInput, Entity, EntityInput, LoginInput, Neighborhood,
    QueryOptions, State, Unit,
};
use rentdesk_core::{ApiError, AuthCredentials};
use rentdesk_uploader::{
    CoordinatorConfig, MediaFile, MediaUploadCoordinator, MediaUploader, UploadState,
    ValueListener,
};

use crate::cli::{Commands, EntityAction, WriteArgs};
use crate::input::{merge_object, read_data};
use crate::require_admin;

/// What a command printed: a JSON body for stdout and an optional
/// notification line.
#[derive(Debug, Clone, PartialEq)]
pub struct Outcome {
    pub body: Value,
    pub message: Option<String>,
}

impl Outcome {
    fn body(body: Value) -> Self {
        Self {
            body,
            message: None,
        }
    }

    fn with_message(body: Value, message: impl Into<String>) -> Self {
        Self {
            body,
            message: Some(message.into()),
        }
    }
}

/// An entity kind the CLI can edit: it can be turned back into its input
/// so that updates can be partial.
pub trait EditableEntity: Entity + Serialize {
    type Input: EntityInput + Serialize + DeserializeOwned;

    fn to_input(&self) -> Result<Self::Input, ApiError>;
}

macro_rules! editable_via_from {
    ($entity:ty, $input:ty) => {
        impl EditableEntity for $entity {
            type Input = $input;

            fn to_input(&self) -> Result<Self::Input, ApiError> {
                Ok(<$input>::from(self))
            }
        }
    };
}

editable_via_from!(State, CreateStateInput);
editable_via_from!(City, CreateCityInput);
editable_via_from!(Neighborhood, CreateNeighborhoodInput);
editable_via_from!(Apartment, CreateApartmentInput);

impl EditableEntity for Unit {
    type Input = CreateUnitInput;

    fn to_input(&self) -> Result<Self::Input, ApiError> {
        CreateUnitInput::try_from_unit(self)
    }
}

pub async fn execute(client: &ApiClient, command: Commands) -> Result<Outcome> {
    match command {
        Commands::Otp { email } => {
            client.request_otp(&email).await?;
            Ok(Outcome::with_message(
                json!({ "email": email }),
                "One-time passcode sent",
            ))
        }
        Commands::Login { email, code } => {
            let input = LoginInput::parse(email, &code)?;
            let credentials = client.login(&input).await?;
            if !credentials.can_administer() {
                tracing::warn!(
                    roles = ?credentials.permissions,
                    "Logged in without an admin role; entity commands will be refused"
                );
            }
            Ok(Outcome::with_message(
                identity(&credentials),
                format!("Welcome, {}", credentials.display_name()),
            ))
        }
        Commands::Logout => {
            client.logout().await?;
            Ok(Outcome::with_message(json!({ "success": true }), "Logged out"))
        }
        Commands::Whoami => Ok(Outcome::body(identity(&client.credentials().load()))),
        Commands::State { action } => run_entity(client, client.states(), action).await,
        Commands::City { action } => run_entity(client, client.cities(), action).await,
        Commands::Neighborhood { action } => {
            run_entity(client, client.neighborhoods(), action).await
        }
        Commands::Apartment { action } => run_entity(client, client.apartments(), action).await,
        Commands::Unit { action } => run_entity(client, client.units(), action).await,
    }
}

fn identity(credentials: &AuthCredentials) -> Value {
    json!({
        "authenticated": credentials.is_authenticated(),
        "admin": credentials.can_administer(),
        "id": credentials.id,
        "name": credentials.display_name(),
        "email": credentials.email,
        "permissions": credentials.permissions,
    })
}

async fn run_entity<T: EditableEntity>(
    client: &ApiClient,
    resource: Resource<T, QueryOptions, T::Input>,
    action: EntityAction,
) -> Result<Outcome> {
    require_admin(&client.credentials().load())?;
    let language = client.config().default_language.as_str();

    match action {
        EntityAction::List(args) => {
            let items = resource.all(&args.to_query(language)).await?;
            Ok(Outcome::body(serde_json::to_value(&items)?))
        }
        EntityAction::Page(args) => {
            let page = resource.paginated(&args.to_query(language)).await?;
            Ok(Outcome::body(serde_json::to_value(&page)?))
        }
        EntityAction::Get { id } => {
            let item = resource.get(&id).await?;
            Ok(Outcome::body(serde_json::to_value(&item)?))
        }
        EntityAction::Create(args) => {
            let raw = args
                .data
                .as_deref()
                .context("--data is required to create a record")?;
            let mut input: T::Input = serde_json::from_value(read_data(raw)?)
                .with_context(|| format!("Invalid {} input", T::KIND))?;
            let media = collect_media(client, input.media().to_vec(), &args).await?;
            input.set_media(media);

            let created = resource.create(&input).await?;
            Ok(Outcome::with_message(
                serde_json::to_value(&created)?,
                success_message(T::KIND, Operation::Created),
            ))
        }
        EntityAction::Update { id, args } => {
            let current = resource.get(&id).await?;
            let mut merged = serde_json::to_value(current.to_input()?)?;
            if let Some(raw) = &args.data {
                merged = merge_object(merged, read_data(raw)?)?;
            }
            let mut input: T::Input = serde_json::from_value(merged)
                .with_context(|| format!("Invalid {} input", T::KIND))?;
            let media = collect_media(client, input.media().to_vec(), &args).await?;
            input.set_media(media);

            let updated = resource.update(&id, &input).await?;
            Ok(Outcome::with_message(
                serde_json::to_value(&updated)?,
                success_message(T::KIND, Operation::Updated),
            ))
        }
        EntityAction::Delete { id } => {
            let deleted = resource.delete(&id).await?;
            let message = if deleted {
                success_message(T::KIND, Operation::Deleted)
            } else {
                format!("{} was not deleted", T::KIND)
            };
            Ok(Outcome::with_message(json!({ "success": deleted }), message))
        }
    }
}

/// Run `--drop-media` and `--media` through an upload coordinator seeded
/// with `initial` and return its settled value.
async fn collect_media(client: &ApiClient, initial: Vec<String>, args: &WriteArgs) -> Result<Vec<String>> {
    if !args.touches_media() {
        return Ok(initial);
    }

    let uploader: Arc<dyn MediaUploader> = Arc::new(client.clone());
    let listener: ValueListener = Arc::new(|value: Vec<String>| {
        tracing::debug!(count = value.len(), "Media value changed");
    });
    let handle = MediaUploadCoordinator::spawn(
        initial,
        uploader,
        listener,
        CoordinatorConfig::from(client.config()),
    );

    let mut drops = args.drop_media.clone();
    drops.sort_unstable();
    drops.dedup();
    for index in drops.into_iter().rev() {
        let removed = handle.remove(index).await?;
        tracing::info!(url = removed.display.as_str(), "Dropped media entry");
    }

    let mut files = Vec::with_capacity(args.media.len());
    for path in &args.media {
        let file = MediaFile::from_path(path)
            .await
            .with_context(|| format!("Failed to read media file: {}", path.display()))?;
        files.push(file);
    }
    handle.select_files(files).await?;

    let value = handle.settled().await?;
    let snapshot = handle.snapshot().await?;
    tracing::info!(
        uploaded = snapshot.count(UploadState::Uploaded),
        failed = snapshot.count(UploadState::Failed),
        "Media settled"
    );
    for item in snapshot
        .items
        .iter()
        .filter(|i| i.state == UploadState::Failed)
    {
        tracing::warn!(file = item.display.as_str(), "Image upload failed, left out of media");
    }
    handle.shutdown().await;
    Ok(value)
}
