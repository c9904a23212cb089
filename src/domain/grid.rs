use super::payments::{ApartmentPayments, MonthSummary, PaymentEntry, PaymentPatch, PaymentStatus};
use crate::actions::{CondoActions, Notifier, Role, Session, Toast};
use crate::config::CondoConfig;
use crate::core::{CondoError, Period, Result};
use crate::interaction::{Highlighter, ToolMode};
use crate::optimistic::{CollectionAction, CollectionSource, DispatchReport, OptimisticView};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;

pub const INVALID_CELL_TITLE: &str = "Invalid payment cell";

/// Bulk-edit verbs of the payment grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentTool {
    MarkPaid,
    MarkPending,
    MarkLate,
}

impl PaymentTool {
    pub const ALL: [PaymentTool; 3] = [Self::MarkPaid, Self::MarkPending, Self::MarkLate];

    pub fn target_status(self) -> PaymentStatus {
        match self {
            Self::MarkPaid => PaymentStatus::Paid,
            Self::MarkPending => PaymentStatus::Pending,
            Self::MarkLate => PaymentStatus::Late,
        }
    }
}

struct ApartmentSource {
    actions: Arc<dyn CondoActions>,
    building_id: Uuid,
    year: i32,
}

#[async_trait]
impl CollectionSource<ApartmentPayments> for ApartmentSource {
    async fn fetch(&self) -> Result<Vec<ApartmentPayments>> {
        self.actions
            .list_apartments(self.building_id, self.year)
            .await
    }
}

/// Manager dashboard grid of apartments × months for one year.
pub struct PaymentGrid {
    session: Session,
    year: i32,
    actions: Arc<dyn CondoActions>,
    notifier: Arc<dyn Notifier>,
    view: OptimisticView<ApartmentPayments>,
    mode: ToolMode<PaymentTool>,
    highlight: Highlighter<Uuid>,
}

impl PaymentGrid {
    pub fn new(
        session: Session,
        year: i32,
        actions: Arc<dyn CondoActions>,
        notifier: Arc<dyn Notifier>,
        config: &CondoConfig,
    ) -> Result<Self> {
        session.require_role(&[Role::Manager], "edit payments")?;

        let source = Arc::new(ApartmentSource {
            actions: Arc::clone(&actions),
            building_id: session.building_id,
            year,
        });
        let view = OptimisticView::new(
            format!("payments:{}:{year}", session.building_id),
            source,
            Arc::clone(&notifier),
            config.controller_options(),
        );

        Ok(Self {
            session,
            year,
            actions,
            notifier,
            view,
            mode: ToolMode::default(),
            highlight: Highlighter::new(config.highlight_ttl),
        })
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn view(&self) -> &OptimisticView<ApartmentPayments> {
        &self.view
    }

    pub fn highlight(&self) -> &Highlighter<Uuid> {
        &self.highlight
    }

    pub async fn load(&self) -> Result<()> {
        self.view.refresh().await?;
        Ok(())
    }

    pub fn mode(&self) -> ToolMode<PaymentTool> {
        self.mode
    }

    pub fn select_tool(&mut self, tool: PaymentTool) -> ToolMode<PaymentTool> {
        let mode = self.mode.select(tool);
        debug!(?tool, ?mode, "payment tool selected");
        mode
    }

    pub fn rows(&self) -> Result<Vec<ApartmentPayments>> {
        Ok(self.view.visible()?.into_iter().collect())
    }

    pub fn row(&self, apartment_id: Uuid) -> Result<Option<ApartmentPayments>> {
        Ok(self
            .view
            .visible()?
            .into_iter()
            .find(|row| row.id == apartment_id))
    }

    pub fn summary(&self, month: u8) -> Result<MonthSummary> {
        let rows = self.view.visible()?;
        Ok(MonthSummary::from_rows(rows.iter(), month))
    }

    /// Applies the active tool to one cell.
    ///
    /// Returns `Ok(None)` when no tool is active. Invalid cells are reported
    /// through a toast and an error before anything is staged.
    pub async fn click_cell(
        &self,
        apartment_id: Uuid,
        month: u8,
    ) -> Result<Option<DispatchReport<PaymentEntry>>> {
        let Some(tool) = self.mode.active() else {
            return Ok(None);
        };

        let period = Period::new(self.year, month).map_err(|err| self.reject_input(err))?;
        let row = self.row(apartment_id)?.ok_or_else(|| {
            self.reject_input(CondoError::validation(format!(
                "apartment {apartment_id} is not part of this grid"
            )))
        })?;

        let status = tool.target_status();
        let action = CollectionAction::update(
            apartment_id,
            PaymentPatch {
                period,
                entry: row.entry_for_status(status),
            },
        );

        let report = self
            .view
            .dispatch(
                action,
                self.actions
                    .update_payment_status(apartment_id, period, status),
            )
            .await?;

        info!(
            unit = %row.unit,
            period = %period,
            status = %status,
            confirmed = report.is_confirmed(),
            "payment cell edited"
        );
        Ok(Some(report))
    }

    /// Highlights the first row whose unit matches `query`, ignoring case.
    pub fn search(&self, query: &str) -> Result<Option<Uuid>> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(None);
        }
        let found = self
            .view
            .visible()?
            .into_iter()
            .find(|row| row.unit.eq_ignore_ascii_case(query))
            .map(|row| row.id);

        if let Some(id) = found {
            self.highlight.set(id);
        }
        Ok(found)
    }

    fn reject_input(&self, err: CondoError) -> CondoError {
        self.notifier
            .notify(Toast::error(INVALID_CELL_TITLE, err.to_string()));
        err
    }
}
