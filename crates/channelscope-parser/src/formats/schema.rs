/// Columns of the per-video export, in export order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VideoColumn {
    VideoId,
    VideoTitle,
    PublishTime,
    CommentsAdded,
    Shares,
    Dislikes,
    Likes,
    SubscribersLost,
    SubscribersGained,
    RpmUsd,
    CpmUsd,
    AveragePercentViewed,
    AverageViewDuration,
    Views,
    WatchTimeHours,
    Subscribers,
    EstimatedRevenueUsd,
    Impressions,
    ImpressionsCtrPercent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Text,
    PublishDate,
    Duration,
    Metric,
}

impl VideoColumn {
    pub fn canonical_name(&self) -> &'static str {
        match self {
            VideoColumn::VideoId => VIDEO_ID,
            VideoColumn::VideoTitle => VIDEO_TITLE,
            VideoColumn::PublishTime => PUBLISH_TIME,
            VideoColumn::CommentsAdded => "comments_added",
            VideoColumn::Shares => "shares",
            VideoColumn::Dislikes => "dislikes",
            VideoColumn::Likes => "likes",
            VideoColumn::SubscribersLost => "subscribers_lost",
            VideoColumn::SubscribersGained => "subscribers_gained",
            VideoColumn::RpmUsd => "rpm_usd",
            VideoColumn::CpmUsd => "cpm_usd",
            VideoColumn::AveragePercentViewed => "average_percent_viewed",
            VideoColumn::AverageViewDuration => "average_view_duration",
            VideoColumn::Views => VIEWS,
            VideoColumn::WatchTimeHours => "watch_time_hours",
            VideoColumn::Subscribers => "subscribers",
            VideoColumn::EstimatedRevenueUsd => "estimated_revenue_usd",
            VideoColumn::Impressions => "impressions",
            VideoColumn::ImpressionsCtrPercent => "impressions_ctr_percent",
        }
    }

    /// Header spellings seen in exports, compared after lowercasing and
    /// dropping whitespace.
    pub fn header_spellings(&self) -> &'static [&'static str] {
        match self {
            VideoColumn::VideoId => &["video", "content"],
            VideoColumn::VideoTitle => &["videotitle"],
            VideoColumn::PublishTime => &["videopublishtime"],
            VideoColumn::CommentsAdded => &["commentsadded"],
            VideoColumn::Shares => &["shares"],
            VideoColumn::Dislikes => &["dislikes"],
            VideoColumn::Likes => &["likes"],
            VideoColumn::SubscribersLost => &["subscriberslost"],
            VideoColumn::SubscribersGained => &["subscribersgained"],
            VideoColumn::RpmUsd => &["rpm(usd)"],
            VideoColumn::CpmUsd => &["cpm(usd)"],
            VideoColumn::AveragePercentViewed => {
                &["average%viewed", "averagepercentageviewed(%)"]
            }
            VideoColumn::AverageViewDuration => &["averageviewduration"],
            VideoColumn::Views => &["views"],
            VideoColumn::WatchTimeHours => &["watchtime(hours)"],
            VideoColumn::Subscribers => &["subscribers"],
            VideoColumn::EstimatedRevenueUsd => &["yourestimatedrevenue(usd)"],
            VideoColumn::Impressions => &["impressions"],
            VideoColumn::ImpressionsCtrPercent => {
                &["impressionsctr(%)", "impressionsclick-throughrate(%)"]
            }
        }
    }

    pub fn kind(&self) -> ColumnKind {
        match self {
            VideoColumn::VideoId | VideoColumn::VideoTitle => ColumnKind::Text,
            VideoColumn::PublishTime => ColumnKind::PublishDate,
            VideoColumn::AverageViewDuration => ColumnKind::Duration,
            _ => ColumnKind::Metric,
        }
    }

    pub fn matches_header(&self, header: &str) -> bool {
        let folded = fold_header(header);
        self.header_spellings()
            .iter()
            .any(|spelling| *spelling == folded)
    }
}

pub const VIDEO_SCHEMA: [VideoColumn; 19] = [
    VideoColumn::VideoId,
    VideoColumn::VideoTitle,
    VideoColumn::PublishTime,
    VideoColumn::CommentsAdded,
    VideoColumn::Shares,
    VideoColumn::Dislikes,
    VideoColumn::Likes,
    VideoColumn::SubscribersLost,
    VideoColumn::SubscribersGained,
    VideoColumn::RpmUsd,
    VideoColumn::CpmUsd,
    VideoColumn::AveragePercentViewed,
    VideoColumn::AverageViewDuration,
    VideoColumn::Views,
    VideoColumn::WatchTimeHours,
    VideoColumn::Subscribers,
    VideoColumn::EstimatedRevenueUsd,
    VideoColumn::Impressions,
    VideoColumn::ImpressionsCtrPercent,
];

pub const VIDEO_ID: &str = "video_id";
pub const VIDEO_TITLE: &str = "video_title";
pub const PUBLISH_TIME: &str = "publish_time";
pub const VIEWS: &str = "views";
pub const EXTERNAL_VIDEO_ID: &str = "external_video_id";
pub const COUNTRY_CODE: &str = "country_code";
pub const IS_SUBSCRIBED: &str = "is_subscribed";
pub const DATE: &str = "date";

/// A header the name-matched loaders require, with the canonical name it is bound to.
#[derive(Debug, Clone, Copy)]
pub struct RequiredHeader {
    pub header: &'static str,
    pub canonical: &'static str,
}

pub const COUNTRY_SUBSCRIBER_HEADERS: &[RequiredHeader] = &[
    RequiredHeader {
        header: "Video Title",
        canonical: VIDEO_TITLE,
    },
    RequiredHeader {
        header: "Country Code",
        canonical: COUNTRY_CODE,
    },
    RequiredHeader {
        header: "Is Subscribed",
        canonical: IS_SUBSCRIBED,
    },
    RequiredHeader {
        header: "Views",
        canonical: VIEWS,
    },
];

pub const DAILY_PERFORMANCE_HEADERS: &[RequiredHeader] = &[
    RequiredHeader {
        header: "External Video ID",
        canonical: EXTERNAL_VIDEO_ID,
    },
    RequiredHeader {
        header: "Video Title",
        canonical: VIDEO_TITLE,
    },
    RequiredHeader {
        header: "Date",
        canonical: DATE,
    },
    RequiredHeader {
        header: "Views",
        canonical: VIEWS,
    },
];

pub(crate) fn fold_header(header: &str) -> String {
    header
        .chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect()
}
